//! Error types for generation, display and export.

use thiserror::Error;

/// Failures of a single generation call. Nothing here is retryable: the
/// caller keeps whatever it displayed last.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("degenerate dimensions {width}x{height}: width and height must be at least 1")]
    DegenerateDimensions { width: usize, height: usize },

    #[error("level of detail {0} is out of range (0-6)")]
    InvalidLevelOfDetail(u8),
}

/// Failures of a `MapDisplay` implementation.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write texture: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures while writing or reading exported artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode heightmap image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid generation record: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
