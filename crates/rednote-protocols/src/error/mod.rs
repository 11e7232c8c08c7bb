//! Error types for the protocol layer.

mod page;
mod tool;

pub use page::*;
pub use tool::*;
