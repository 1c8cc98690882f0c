//! Error type shared by the configuration document and the compilation
//! tracker.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum CocoonError {
    /// The configuration text is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document parsed but its root element is not `<widget>`.
    #[error("Missing <widget> root element")]
    MissingWidget,

    /// The operation needs a document that parsed successfully.
    #[error("Configuration document is errored")]
    ErroredDocument,

    /// Reading or writing a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A project record could not be decoded.
    #[error("Invalid project data: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote service (or whatever stands in for it) reported a failure.
    #[error("Request failed: {0}")]
    Api(String),

    /// Some platform was still compiling when the wait deadline passed.
    #[error("Compilation still running after {waited:?}")]
    Timeout { waited: Duration },

    /// The caller cancelled a running wait.
    #[error("Wait for compilation was cancelled")]
    Cancelled,
}

impl CocoonError {
    /// Shorthand for building an [`CocoonError::Api`] from any message.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }
}
