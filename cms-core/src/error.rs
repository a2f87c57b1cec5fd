//! Error types shared by every microCMS client crate.
//!
//! All failures a client operation can surface are unified into a single
//! `CmsError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using CmsError.
pub type CmsResult<T> = Result<T, CmsError>;

/// Unified error type covering all error categories of the client.
#[derive(Error, Debug)]
pub enum CmsError {
    // -- Construction / call errors --
    /// Invalid or missing client construction parameters.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required call parameter is missing. Raised before any network I/O.
    #[error("{0}")]
    Validation(String),

    // -- Network errors --
    /// Transport-level failure (DNS, connection reset, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("fetch API response status: {status}{}", format_message(.message))]
    Api {
        /// HTTP status code.
        status: u16,
        /// `message` field of the response body, when the body carried one.
        message: Option<String>,
    },

    // -- Pagination errors --
    /// A field selected for id collection did not hold a string.
    #[error("the value of the field `{0}` is not a string")]
    FieldType(String),

    // -- Data errors --
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!("\n  message is `{m}`"),
        None => String::new(),
    }
}

impl CmsError {
    /// HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            CmsError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Network failures, 429 and every non-4xx error status are transient;
    /// all other kinds are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            CmsError::Network(_) => true,
            CmsError::Api { status, .. } => !is_client_error(*status),
            _ => false,
        }
    }
}

/// A 4xx status other than 429 Too Many Requests.
pub fn is_client_error(status: u16) -> bool {
    (400..500).contains(&status) && status != 429
}

impl From<serde_json::Error> for CmsError {
    fn from(e: serde_json::Error) -> Self {
        CmsError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CmsError {
    fn from(e: toml::de::Error) -> Self {
        CmsError::Config(e.to_string())
    }
}
