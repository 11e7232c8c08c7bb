//! Shared types.

mod common;

pub use common::*;
