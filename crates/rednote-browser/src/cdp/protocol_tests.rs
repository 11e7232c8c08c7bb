use super::*;

#[test]
fn test_request_targets_session() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://www.xiaohongshu.com/explore"})),
        session_id: Some("SESSION".to_string()),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["method"], "Page.navigate");
    assert_eq!(json["sessionId"], "SESSION");
}

#[test]
fn test_browser_level_request_omits_session() {
    let req = CdpRequest {
        id: 2,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

fn classify(raw: &str) -> Incoming {
    serde_json::from_str::<CdpMessage>(raw).unwrap().classify()
}

#[test]
fn test_reply_with_result() {
    match classify(r#"{"id": 1, "result": {"frameId": "abc"}}"#) {
        Incoming::Reply { id, outcome } => {
            assert_eq!(id, 1);
            assert_eq!(outcome.unwrap()["frameId"], "abc");
        }
        other => panic!("expected reply, got {:?}", other),
    }
}

#[test]
fn test_reply_without_result_is_null() {
    match classify(r#"{"id": 3}"#) {
        Incoming::Reply { outcome, .. } => assert!(outcome.unwrap().is_null()),
        other => panic!("expected reply, got {:?}", other),
    }
}

#[test]
fn test_reply_with_error() {
    match classify(r#"{"id": 4, "error": {"code": -32000, "message": "No node with given id"}}"#) {
        Incoming::Reply {
            outcome: Err(CdpError::Protocol { code, message }),
            ..
        } => {
            assert_eq!(code, -32000);
            assert!(message.contains("No node"));
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_event_keeps_session() {
    match classify(r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.0}, "sessionId": "S1"}"#) {
        Incoming::Event(event) => {
            assert_eq!(event.method, "Page.loadEventFired");
            assert_eq!(event.session_id, "S1");
            assert_eq!(event.params["timestamp"], 1.0);
        }
        other => panic!("expected event, got {:?}", other),
    }
}

#[test]
fn test_empty_frame_is_ignored() {
    assert!(matches!(classify("{}"), Incoming::Ignored));
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/126.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/126.0.0.0");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_target_info_deserialize() {
    let json = r#"{"id": "page123", "type": "page", "title": "", "url": "about:blank"}"#;
    let info: TargetInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.url, "about:blank");
}

#[test]
fn test_input_enums_serialize() {
    assert_eq!(serde_json::to_string(&MouseButton::Left).unwrap(), "\"left\"");
    assert_eq!(
        serde_json::to_string(&MouseEventType::MousePressed).unwrap(),
        "\"mousePressed\""
    );
    assert_eq!(serde_json::to_string(&KeyEventType::RawKeyDown).unwrap(), "\"rawKeyDown\"");
}
