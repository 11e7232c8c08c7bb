//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chrome via the browser-level WebSocket and multiplexes page
//! sessions over it using flattened `Target.attachToTarget` sessions.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.new_page(None).await?;
//! page.navigate("https://www.xiaohongshu.com/explore").await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
