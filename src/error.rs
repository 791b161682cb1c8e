use thiserror::Error;

/// Errors surfaced by the pipeline to its caller.
///
/// Parameter input never produces an error (it is clamped), so everything
/// here is either a user-facing condition or an I/O failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("File is too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid output dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Invalid scale factor: {0}")]
    InvalidScale(f64),

    #[error("No image loaded")]
    NoImage,

    #[error("Buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a pixel-transform capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Transform rejected input: {0}")]
    Rejected(String),
}

/// Error parsing a hex colour string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,

    #[error("invalid hex digits: {0}")]
    InvalidHex(String),
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("Invalid color at index {index}: {source}")]
    InvalidColor {
        index: usize,
        #[source]
        source: ParseColorError,
    },

    #[error("Palette index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Palette import format error: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Preference file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preference file is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}
