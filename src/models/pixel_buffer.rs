use crate::error::PipelineError;

/// Row-major RGBA8 pixel buffer.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub const CHANNELS: usize = 4;

    /// Transparent black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Buffer where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            data: rgba.repeat(width as usize * height as usize),
        }
    }

    /// Wrap existing RGBA bytes, checking the length invariant.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PipelineError> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(PipelineError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * Self::CHANNELS
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height; 1.0 for an empty buffer.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of the bytes. A slice, so the length cannot change.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * Self::CHANNELS
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        self.data[i..i + Self::CHANNELS].copy_from_slice(&rgba);
    }

    /// Replace RGB with `255 - RGB`, leaving alpha alone.
    pub fn invert_rgb(&mut self) {
        for px in self.data.chunks_exact_mut(Self::CHANNELS) {
            for c in &mut px[..3] {
                *c = 255 - *c;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent_black() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.data().len(), 24);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_rgba_checks_length() {
        let err = PixelBuffer::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        match err {
            PipelineError::BufferSize { expected, actual } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("Expected BufferSize, got {other:?}"),
        }
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_pixel_roundtrip() {
        let mut buf = PixelBuffer::new(4, 3);
        buf.set_pixel(3, 2, [1, 2, 3, 4]);
        assert_eq!(buf.pixel(3, 2), [1, 2, 3, 4]);
        assert_eq!(buf.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_invert_keeps_alpha() {
        let mut buf = PixelBuffer::filled(2, 1, [0, 100, 255, 42]);
        buf.invert_rgb();
        assert_eq!(buf.pixel(1, 0), [255, 155, 0, 42]);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(PixelBuffer::new(400, 100).aspect_ratio(), 4.0);
        assert_eq!(PixelBuffer::new(5, 0).aspect_ratio(), 1.0);
    }
}
