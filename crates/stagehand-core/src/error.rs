//! Error types for the editor core.

use thiserror::Error;

/// Editor errors.
///
/// Most interaction problems are degenerate gestures rather than faults and
/// never surface as errors; these cover the few fallible boundaries.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to serialize object: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to deserialize object: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
