//! CDP page session for interacting with a single tab.

mod core;
mod dom;
mod input;
mod js;
mod navigation;
mod network;
mod page;

pub use self::core::PageSession;
