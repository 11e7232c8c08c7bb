//! Browser automation for rednote-mcp via Chrome DevTools Protocol (CDP).
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │  rednote-core   │ ◄──────────────► │   Chrome         │
//! │  (Page trait)   │       CDP        │  (managed tab)   │
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! [`BrowserManager`] launches (or attaches to) Chrome with a persistent
//! profile, and hands out one [`PageLease`] per top-level operation. The
//! lease implements [`rednote_protocols::PageOwner`] and closes its tab on
//! every exit path.

pub mod cdp;
mod cookies;
pub mod manager;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use cookies::{CookieError, CookieStore};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig, PageLease};
