//! # rednote-config
//!
//! Configuration management for rednote-mcp: TOML schema with defaults,
//! `${VAR}` and `~` expansion, and validation.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, Finding, Severity, ValidationResult};
