// src/utils/errors.rs
//! Error types for the trace codec
//!
//! These errors only travel between the byte sink and the serializer: the
//! serializer converts every failure into its latched fail-soft state and
//! never surfaces an error to tracing call sites.

use thiserror::Error;

/// Codec error type
#[derive(Debug, Error)]
pub enum CodecError {
    /// The sink could not be opened for writing
    #[error("sink open failed: {0}")]
    OpenFailed(String),

    /// The sink rejected a write
    #[error("sink write failed: {0}")]
    WriteFailed(String),

    /// The sink rejected an absolute seek
    #[error("sink seek failed: {0}")]
    SeekFailed(String),
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
