// src/error.rs

//! Unified error handling for the aggregation pipeline.

use thiserror::Error;

/// Result type alias for aggregator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A fetch completed with an unusable response (e.g. non-2xx status)
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// JSON feed was malformed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML feed was malformed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An in-flight request was cancelled cooperatively
    #[error("Request cancelled")]
    Cancelled,

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unexpected failure that aborts the whole query run
    #[error("Fatal query error: {0}")]
    Fatal(String),
}

impl AppError {
    /// Create a fetch error with the offending URL.
    pub fn fetch(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fatal query error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Whether this error is contained at the provider-client boundary.
    ///
    /// Soft errors (network, malformed feed, cancellation) yield an empty
    /// result for that one source; everything else aborts the whole run.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Fetch { .. }
                | Self::Json(_)
                | Self::Xml(_)
                | Self::Url(_)
                | Self::Cancelled
        )
    }
}
