//! The browser-level DevTools WebSocket and its request multiplexer.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpMessage, CdpRequest, Incoming, TargetInfo};
use super::session::PageSession;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Writer = SplitSink<Socket, Message>;
type Reader = SplitStream<Socket>;
type Waiters = Mutex<HashMap<u64, tokio::sync::oneshot::Sender<Result<Value, CdpError>>>>;

/// Upper bound for a single CDP command.
pub(crate) const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Command sender shared by the client and every page session on it.
#[derive(Clone)]
pub(crate) struct Transport {
    writer: Arc<tokio::sync::Mutex<Writer>>,
    next_id: Arc<AtomicU64>,
    waiters: Arc<Waiters>,
}

impl Transport {
    /// Send `method` and wait for its reply. `session_id` routes the command
    /// to an attached tab; `None` talks to the browser.
    ///
    /// The waiter slot is removed when this future finishes or is dropped.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        })?;
        trace!(id, "CDP -> {}", frame);

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.waiters.lock().insert(id, tx);
        let _slot = WaiterSlot {
            id,
            waiters: &self.waiters,
        };

        self.writer.lock().await.send(Message::Text(frame.into())).await?;

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => Err(CdpError::Timeout(format!("{method} got no reply in {}s", CALL_TIMEOUT.as_secs()))),
        }
    }
}

/// Removes a waiter on drop, so a cancelled call never leaks its slot.
struct WaiterSlot<'a> {
    id: u64,
    waiters: &'a Waiters,
}

impl Drop for WaiterSlot<'_> {
    fn drop(&mut self) {
        self.waiters.lock().remove(&self.id);
    }
}

/// One connection to Chrome. Tabs are flattened sessions over it.
pub struct CdpClient {
    http_endpoint: String,
    browser_ws_url: String,
    transport: Transport,
    reader: JoinHandle<()>,
}

impl CdpClient {
    /// Discover the browser socket through `{endpoint}/json/version` and
    /// connect to it.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let unavailable = |e: reqwest::Error| CdpError::ChromeNotAvailable(format!("{http_endpoint}: {e}"));

        let version: BrowserVersion = reqwest::get(format!("{http_endpoint}/json/version"))
            .await
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;
        debug!("DevTools reports {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;
        let (socket, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("{browser_ws_url}: {e}")))?;
        let (writer, reader) = socket.split();

        let transport = Transport {
            writer: Arc::new(tokio::sync::Mutex::new(writer)),
            next_id: Arc::new(AtomicU64::new(1)),
            waiters: Arc::new(Mutex::new(HashMap::new())),
        };
        let reader = tokio::spawn(Self::read_frames(reader, transport.waiters.clone()));

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            transport,
            reader,
        })
    }

    /// Deliver replies to their waiters until the socket closes.
    async fn read_frames(mut reader: Reader, waiters: Arc<Waiters>) {
        while let Some(frame) = reader.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!("DevTools socket error: {}", e);
                    break;
                }
            };
            let message = match serde_json::from_str::<CdpMessage>(&text) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Unreadable CDP frame: {}", e);
                    continue;
                }
            };
            match message.classify() {
                Incoming::Reply { id, outcome } => {
                    if let Some(tx) = waiters.lock().remove(&id) {
                        let _ = tx.send(outcome);
                    }
                }
                Incoming::Event(event) => trace!(session = %event.session_id, "CDP event {}", event.method),
                Incoming::Ignored => {}
            }
        }
        debug!("DevTools socket closed");
        // Dropping the senders fails every outstanding call with SessionClosed.
        waiters.lock().clear();
    }

    /// A browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.call(method, params, None).await
    }

    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    pub fn is_alive(&self) -> bool {
        !self.reader.is_finished()
    }

    /// Open a blank tab (or `url`) and attach to it.
    pub async fn new_page(&self, url: Option<&str>) -> Result<PageSession, CdpError> {
        let create = format!("{}/json/new?{}", self.http_endpoint, url.unwrap_or("about:blank"));
        // `/json/new` only accepts PUT on current Chrome.
        let target: TargetInfo = reqwest::Client::new().put(&create).send().await?.json().await?;
        debug!("Created tab {} ({})", target.id, target.url);
        self.attach_page(&target.id).await
    }

    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let reply = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;
        let session_id = reply["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("attachToTarget returned no sessionId".into()))?;

        let session = PageSession::new(target_id.to_string(), session_id.to_string(), self.transport.clone());
        session.enable_domains().await?;
        Ok(session)
    }

    pub async fn close_page(&self, session: &PageSession) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": session.target_id()})))
            .await?;
        debug!("Closed tab {}", session.target_id());
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
