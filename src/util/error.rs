//! Error types for bowtie.

use thiserror::Error;

/// Result alias for bowtie operations.
pub type RectifyResult<T> = std::result::Result<T, RectifyError>;

/// Errors that can occur when building profiles or running the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RectifyError {
    /// `run` was called before `prepare`.
    #[error("engine is not prepared; call prepare() before run()")]
    NotPrepared,
    /// The source image does not match the dimensions the engine or profile
    /// was prepared for.
    #[error(
        "dimension mismatch: prepared for {expected_width}x{expected_height}, got {width}x{height}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// Image dimensions cannot be represented in memory.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// A pixel buffer is too small for the requested dimensions.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Physical parameters produce degenerate geometry.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: &'static str },
    /// The worker pool could not be created.
    #[error("thread pool: {reason}")]
    ThreadPool { reason: String },
}
