//! # rednote-core
//!
//! The progressive harvesting engine and account actions behind
//! rednote-mcp. Everything here drives a browser tab through
//! [`rednote_protocols::Page`] and never owns one.
//!
//! ## Layout
//!
//! - [`harvest`] - stability wait, state extraction, scroll pagination,
//!   navigation tactics and result post-processing
//! - [`filter`] - search filter translation
//! - [`feeds`] - home, saved, search, profile and comment harvesters
//! - [`actions`] - login, publish, comment, like and favorite
//! - [`media`] - image URL handling and downloads for publishing

pub mod actions;
pub mod error;
pub mod feeds;
pub mod filter;
pub mod harvest;
pub mod media;
pub mod models;
mod page_ext;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::HarvestError;
pub use filter::{FilterOption, FilterTranslator, InternalFilterDirective};
pub use models::*;
pub use page_ext::PageExt;

/// Site origin every harvester navigates within.
pub const SITE_ORIGIN: &str = "https://www.xiaohongshu.com";
