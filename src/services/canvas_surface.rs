use crate::error::PipelineError;
use crate::models::PixelBuffer;
use crate::rendering::{encode_png, resample_nearest};

/// Owner of the original snapshot and the presented result.
#[derive(Debug, Clone, Default)]
pub struct CanvasSurface {
    original: Option<PixelBuffer>,
    presented: Option<PixelBuffer>,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the original with `image` drawn at `width` x `height`.
    /// The presented content is left alone until the next `present`.
    pub fn capture_snapshot(&mut self, image: &PixelBuffer, width: u32, height: u32) {
        tracing::debug!(
            source_width = image.width(),
            source_height = image.height(),
            width,
            height,
            "Capturing snapshot"
        );
        self.original = Some(resample_nearest(image, width, height));
    }

    pub fn original(&self) -> Option<&PixelBuffer> {
        self.original.as_ref()
    }

    /// Fresh working buffer cloned from the original.
    pub fn working_copy(&self) -> Result<PixelBuffer, PipelineError> {
        self.original.clone().ok_or(PipelineError::NoImage)
    }

    /// Make `buffer` the visible content. Its dimensions become the
    /// reported ones.
    pub fn present(&mut self, buffer: PixelBuffer) {
        self.presented = Some(buffer);
    }

    pub fn presented(&self) -> Option<&PixelBuffer> {
        self.presented.as_ref()
    }

    pub fn presented_dimensions(&self) -> Option<(u32, u32)> {
        self.presented.as_ref().map(PixelBuffer::dimensions)
    }

    /// Aspect ratio of the last presented content, falling back to the
    /// original before anything was presented.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.presented
            .as_ref()
            .or(self.original.as_ref())
            .map(PixelBuffer::aspect_ratio)
    }

    /// Height matching `width` at the current aspect ratio.
    pub fn height_for_width(&self, width: u32) -> Option<u32> {
        let aspect = self.aspect_ratio()?;
        Some(((width as f64 / aspect).round() as u32).max(1))
    }

    /// Width matching `height` at the current aspect ratio.
    pub fn width_for_height(&self, height: u32) -> Option<u32> {
        let aspect = self.aspect_ratio()?;
        Some(((height as f64 * aspect).round() as u32).max(1))
    }

    /// Serialize the presented content as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, PipelineError> {
        let presented = self.presented.as_ref().ok_or(PipelineError::NoImage)?;
        encode_png(presented)
    }
}
