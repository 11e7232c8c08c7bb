//! # rednote-protocols
//!
//! Core protocol definitions (traits) for rednote-mcp.
//! Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`Page`] - One browser tab, the boundary every harvester drives
//! - [`PageOwner`] - Owned page handle that can be released explicitly
//! - [`Tool`] - Trait for agent-facing tool implementations

pub mod error;
pub mod page;
pub mod tool;
pub mod types;

pub use error::{PageError, ToolError};
pub use page::{Cookie, Element, Page, PageOwner};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolImage, ToolResult};
pub use types::*;
