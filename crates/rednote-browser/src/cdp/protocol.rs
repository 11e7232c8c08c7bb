//! CDP wire types: commands out, replies and events in, plus the few
//! payloads the session decodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::CdpError;

/// Outgoing command. `session_id` routes it to an attached tab.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Any frame Chrome sends: a command reply (has `id`) or an event.
#[derive(Debug, Deserialize)]
pub struct CdpMessage {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpFault>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CdpFault {
    pub code: i64,
    pub message: String,
}

/// A decoded incoming frame.
#[derive(Debug)]
pub enum Incoming {
    Reply {
        id: u64,
        outcome: Result<Value, CdpError>,
    },
    Event(CdpEvent),
    /// Neither a reply nor an event.
    Ignored,
}

/// An event scoped to a session; browser-level events carry an empty id.
#[derive(Debug, Clone)]
pub struct CdpEvent {
    pub session_id: String,
    pub method: String,
    pub params: Value,
}

impl CdpMessage {
    pub fn classify(self) -> Incoming {
        if let Some(id) = self.id {
            let outcome = match self.error {
                Some(fault) => Err(CdpError::Protocol {
                    code: fault.code,
                    message: fault.message,
                }),
                None => Ok(self.result.unwrap_or(Value::Null)),
            };
            return Incoming::Reply { id, outcome };
        }
        match self.method {
            Some(method) => Incoming::Event(CdpEvent {
                session_id: self.session_id.unwrap_or_default(),
                method,
                params: self.params.unwrap_or(Value::Null),
            }),
            None => Incoming::Ignored,
        }
    }
}

/// `/json/version`. Chrome names these fields in PascalCase.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// A target created through `/json/new`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// Root returned by `DOM.getDocument`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRoot {
    pub node_id: i64,
}

/// `DOM.getBoxModel`; `content` is a quad of x,y pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct BoxModel {
    pub content: Vec<f64>,
}

impl BoxModel {
    /// Centre of the content quad, or `None` for a degenerate quad.
    pub fn center(&self) -> Option<(f64, f64)> {
        let quad = self.content.get(..8)?;
        let xs: f64 = quad.iter().step_by(2).sum();
        let ys: f64 = quad.iter().skip(1).step_by(2).sum();
        Some((xs / 4.0, ys / 4.0))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    None,
    Left,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventType {
    MousePressed,
    MouseReleased,
    MouseMoved,
}

/// `rawKeyDown` is used for keys without text (Enter, Backspace).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
    RawKeyDown,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
