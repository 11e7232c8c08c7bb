//! Sanity checks run on a loaded [`Config`] before anything starts.
//!
//! Errors stop startup. Warnings are logged and the server runs anyway.

use crate::error::ConfigError;
use crate::schema::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One problem with one config key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub path: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// The first error as a [`ConfigError`], or the warnings.
    pub fn into_result(self) -> Result<Vec<Finding>, ConfigError> {
        let (errors, warnings): (Vec<_>, Vec<_>) = self
            .findings
            .into_iter()
            .partition(|f| f.severity == Severity::Error);
        match errors.into_iter().next() {
            Some(first) => Err(ConfigError::Invalid {
                field: first.path.to_string(),
                message: first.message,
            }),
            None => Ok(warnings),
        }
    }

    fn check(&mut self, failed: bool, severity: Severity, path: &'static str, message: impl Into<String>) {
        if failed {
            self.findings.push(Finding {
                severity,
                path,
                message: message.into(),
            });
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        use Severity::{Error, Warning};

        let mut out = ValidationResult::default();
        let (server, browser, harvest) = (&config.server, &config.browser, &config.harvest);

        out.check(server.port == 0, Error, "server.port", "must not be 0");
        out.check(server.host.trim().is_empty(), Error, "server.host", "must not be empty");

        out.check(browser.debug_port == 0, Error, "browser.debug_port", "must not be 0");
        out.check(
            browser.debug_port == server.port,
            Error,
            "browser.debug_port",
            "collides with server.port",
        );
        out.check(
            browser.viewport_width == 0 || browser.viewport_height == 0,
            Error,
            "browser.viewport",
            "width and height must be positive",
        );
        if let Some(bin) = browser.bin_path() {
            out.check(
                !bin.exists(),
                Warning,
                "browser.bin_path",
                format!("{} does not exist, falling back to auto-detection", bin.display()),
            );
        }

        out.check(harvest.saved_feeds_limit == 0, Error, "harvest.saved_feeds_limit", "must be positive");
        out.check(harvest.stable_rounds == 0, Error, "harvest.stable_rounds", "must be positive");
        out.check(
            harvest.request_timeout_secs == 0,
            Error,
            "harvest.request_timeout_secs",
            "must be positive",
        );
        out.check(
            harvest.max_scroll_rounds == 0,
            Warning,
            "harvest.max_scroll_rounds",
            "0 rounds harvests only the first screen",
        );
        out.check(
            harvest.max_scroll_rounds > 100,
            Warning,
            "harvest.max_scroll_rounds",
            "over 100 rounds can keep a request busy for minutes",
        );

        out.check(
            config.login.qrcode_timeout_secs == 0,
            Error,
            "login.qrcode_timeout_secs",
            "must be positive",
        );
        out
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
