//! Reading `rednote.toml`.
//!
//! `${VAR}` placeholders anywhere in the file are resolved from the process
//! environment before the TOML is parsed. An unset variable is an error,
//! never an empty string.

use std::path::Path;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

const PLACEHOLDER: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load_str(&std::fs::read_to_string(path)?)
    }

    /// `None` means "no file given on the command line": run on defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        path.map_or_else(|| Ok(Config::default()), Self::load)
    }

    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let resolved = resolve_placeholders(content, |name| std::env::var(name).ok())?;
        Ok(toml::from_str(&resolved)?)
    }
}

/// Substitute every `${NAME}` with `lookup(NAME)`, left to right.
fn resolve_placeholders(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let pattern = Regex::new(PLACEHOLDER)?;
    let mut out = String::with_capacity(content.len());
    let mut copied = 0;

    for caps in pattern.captures_iter(content) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let name = &caps[1];
        let value = lookup(name).ok_or_else(|| ConfigError::MissingEnv(name.to_string()))?;
        out.push_str(&content[copied..whole.start]);
        out.push_str(&value);
        copied = whole.end;
    }
    out.push_str(&content[copied..]);
    Ok(out)
}
