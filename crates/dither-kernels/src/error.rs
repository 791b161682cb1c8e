//! Error types for the dithering entry point.

use std::fmt;

/// Error returned by [`apply_dither`](crate::apply_dither).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DitherError {
    /// The variant name is not one of [`VARIANTS`](crate::VARIANTS)
    UnknownVariant(String),
    /// The matrix-based variant was called without matrix dimensions
    MissingMatrix,
    /// Buffer length does not match `width * height * 4`
    BufferSize {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },
}

impl fmt::Display for DitherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherError::UnknownVariant(name) => write!(f, "unknown dither variant: {}", name),
            DitherError::MissingMatrix => {
                write!(f, "ordered dithering requires matrix dimensions")
            }
            DitherError::BufferSize { expected, actual } => {
                write!(
                    f,
                    "buffer length mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DitherError {}
