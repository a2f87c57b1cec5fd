//! microCMS Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other client crates:
//! - File-based client configuration (service domain, API key, retry, pagination)
//! - The error taxonomy surfaced by every client operation
//! - Structured logging with tracing
//! - Platform directories and service constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{CmsError, CmsResult};
pub use logging::init_logging;
pub use platform::Platform;
