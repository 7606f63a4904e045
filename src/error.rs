use thiserror::Error;

/// Unified error type for version-gate operations
///
/// Validation rejections are not errors; they travel as
/// [`crate::validator::BumpOutcome`] values. This type covers the things that
/// stop a run from reaching a decision at all.
#[derive(Error, Debug)]
pub enum VersionGateError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("History unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Registry unavailable: {0}")]
    Registry(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in version-gate
pub type Result<T> = std::result::Result<T, VersionGateError>;

impl VersionGateError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersionGateError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        VersionGateError::Version(msg.into())
    }

    /// Create a fatal history error with context
    pub fn history(msg: impl Into<String>) -> Self {
        VersionGateError::HistoryUnavailable(msg.into())
    }

    /// Create a registry error with context
    pub fn registry(msg: impl Into<String>) -> Self {
        VersionGateError::Registry(msg.into())
    }

    /// Create a metadata error with context
    pub fn metadata(msg: impl Into<String>) -> Self {
        VersionGateError::Metadata(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        VersionGateError::Tag(msg.into())
    }

    /// Create an output error with context
    pub fn output(msg: impl Into<String>) -> Self {
        VersionGateError::Output(msg.into())
    }

    /// Whether this error means the release state could not be established
    pub fn is_fatal_history(&self) -> bool {
        matches!(
            self,
            VersionGateError::HistoryUnavailable(_) | VersionGateError::Git(_)
        )
    }
}
