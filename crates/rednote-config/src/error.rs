//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A `${VAR}` placeholder names an unset variable.
    #[error("${{{0}}} is referenced but not set")]
    MissingEnv(String),

    #[error("bad placeholder pattern: {0}")]
    Placeholder(#[from] regex::Error),

    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_path() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/rednote.toml"));
        assert_eq!(err.to_string(), "config file /etc/rednote.toml does not exist");
    }

    #[test]
    fn test_missing_env_shows_placeholder() {
        let err = ConfigError::MissingEnv("XHS_PROFILE".to_string());
        assert_eq!(err.to_string(), "${XHS_PROFILE} is referenced but not set");
    }

    #[test]
    fn test_invalid_names_field() {
        let err = ConfigError::Invalid {
            field: "harvest.stable_rounds".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert_eq!(err.to_string(), "harvest.stable_rounds: must be at least 1");
    }
}
