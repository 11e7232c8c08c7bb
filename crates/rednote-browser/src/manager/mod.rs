//! Browser instance manager.
//!
//! Launches Chrome with a persistent profile (or attaches to one already
//! listening on the debug port) and leases out one tab per operation.

mod lease;
mod manager_core;
mod manager_pages;
mod manager_types;

pub use lease::PageLease;
pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
