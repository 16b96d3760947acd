//! Equalizer Error Types

use thiserror::Error;

/// Errors that can occur in the equalizer core
///
/// None of these escape the controller/session boundary; callers log them
/// and carry on with whatever state the graph has.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EqError {
    /// Fatal for this element: it can never get another source. Reload the page.
    #[error("Media element {0} already has an audio source attached; reload the page")]
    SourceAlreadyAttached(u64),

    #[error("Settings unavailable: {0}")]
    SettingsUnavailable(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Equalizer not initialized")]
    NotReady,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Platform error: {0}")]
    Platform(mqt_platform::PlatformError),
}

impl From<mqt_platform::PlatformError> for EqError {
    fn from(err: mqt_platform::PlatformError) -> Self {
        match err {
            mqt_platform::PlatformError::SourceAlreadyAttached(id) => EqError::SourceAlreadyAttached(id),
            other => EqError::Platform(other),
        }
    }
}

/// Result type alias for equalizer operations
pub type EqResult<T> = Result<T, EqError>;
