use serde_json::json;

use super::*;

#[test]
fn test_plain_success() {
    let result = ToolResult::success("done");
    assert!(result.success);
    assert_eq!(result.content, "done");
    assert!(result.error.is_none());
}

#[test]
fn test_json_output_is_pretty() {
    let result = ToolResult::success_json(json!({"count": 2}));
    assert_eq!(result.content, "{\n  \"count\": 2\n}");
}

#[test]
fn test_error_repeats_reason_as_content() {
    let result = ToolResult::error("login required");
    assert!(!result.success);
    assert_eq!(result.content, "login required");
    assert_eq!(result.error.as_deref(), Some("login required"));
}

#[test]
fn test_qrcode_result_carries_image() {
    let result = ToolResult::success("scan the code").with_image("aGVsbG8=", "image/png");
    assert_eq!(
        result.images,
        vec![ToolImage {
            data: "aGVsbG8=".into(),
            mime_type: "image/png".into(),
        }]
    );
}

#[test]
fn test_empty_fields_not_serialized() {
    let json = serde_json::to_value(ToolResult::success("ok")).unwrap();
    assert_eq!(json, json!({"success": true, "content": "ok"}));
}
