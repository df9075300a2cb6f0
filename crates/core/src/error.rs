//! Error types for mdpick operations.
//!
//! This module defines the main error type [`MdPickError`] which represents
//! everything that can go wrong while loading configuration, sanitizing a
//! selection, converting it to Markdown or fetching the source document.
//!
//! Navigation never produces errors: a missing parent, sibling or child simply
//! leaves the selection where it is.
//!
//! # Example
//!
//! ```rust
//! use mdpick_core::{MdPickError, Result};
//!
//! fn convert_selection(html: &str) -> Result<String> {
//!     if html.is_empty() {
//!         return Err(MdPickError::Conversion("nothing selected".to_string()));
//!     }
//!     // ... conversion logic
//!     # Ok(String::new())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the selection-and-conversion pipeline.
#[derive(Error, Debug)]
pub enum MdPickError {
    /// Malformed persisted or user-supplied configuration.
    ///
    /// Persisted corruption is recovered by falling back to the built-in
    /// defaults; user edits carrying this error are rejected.
    #[error("Invalid configuration for '{key}': {message}")]
    ConfigParse { key: String, message: String },

    /// Filtering or Markdown conversion failed for the confirmed selection.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// A conversion or rendering engine is missing.
    ///
    /// Returned when the crate was built without the engine feature or the
    /// session was constructed without one. Only the dependent feature degrades.
    #[error("{0} engine is unavailable")]
    CollaboratorUnavailable(&'static str),

    /// HTML parsing errors.
    ///
    /// Returned for invalid CSS selectors and undecodable markup.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Activation chord could not be parsed.
    #[error("Invalid shortcut: {0}")]
    InvalidShortcut(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    ///
    /// Wraps standard I/O errors for file operations.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),
}

impl MdPickError {
    pub(crate) fn config(key: &str, err: impl std::fmt::Display) -> Self {
        MdPickError::ConfigParse { key: key.to_string(), message: err.to_string() }
    }
}

/// Result type alias for MdPickError.
pub type Result<T> = std::result::Result<T, MdPickError>;
