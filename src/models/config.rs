//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-provider enable flags
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Presentation settings passed through to the result sink
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Violations are fatal for a query run, not per-source soft failures.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.display.template.trim().is_empty() {
            return Err(AppError::validation("display.template is empty"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum provider fetches in flight at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Which provider catalogs participate in a query.
///
/// The field order here is not the aggregation order; the orchestrator owns
/// the fixed source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "defaults::enabled")]
    pub coursera: bool,

    #[serde(default = "defaults::enabled")]
    pub udemy: bool,

    #[serde(default = "defaults::enabled")]
    pub edx: bool,

    #[serde(default = "defaults::enabled")]
    pub udacity: bool,

    #[serde(default = "defaults::enabled")]
    pub iversity: bool,

    #[serde(default = "defaults::enabled")]
    pub open_learning: bool,
}

impl ProvidersConfig {
    /// Look up the enable flag by grouping key (lower-cased provider name).
    pub fn is_enabled(&self, key: &str) -> bool {
        match key {
            "coursera" => self.coursera,
            "udemy" => self.udemy,
            "edx" => self.edx,
            "udacity" => self.udacity,
            "iversity" => self.iversity,
            "openlearning" => self.open_learning,
            _ => false,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            coursera: true,
            udemy: true,
            edx: true,
            udacity: true,
            iversity: true,
            open_learning: true,
        }
    }
}

/// Presentation settings the core passes through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Result-card template selector, opaque to the pipeline
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; coursefeed/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn template() -> String {
        "grid".into()
    }
}
