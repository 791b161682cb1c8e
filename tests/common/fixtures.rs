//! Test images and constants.

use dither_live::models::PixelBuffer;
use dither_live::services::IncomingImage;

/// A small, plausible encoded file size
pub const SMALL_FILE: u64 = 64 * 1024;

/// One byte over the 20 MiB ingestion limit
pub const OVERSIZED_FILE: u64 = 20 * 1024 * 1024 + 1;

/// Opaque image whose red channel runs through `reds` left to right.
pub fn red_strip(reds: &[u8]) -> PixelBuffer {
    let mut buf = PixelBuffer::new(reds.len() as u32, 1);
    for (x, &r) in reds.iter().enumerate() {
        buf.set_pixel(x as u32, 0, [r, 0, 0, 255]);
    }
    buf
}

/// Opaque image where every pixel has a distinct colour, so rotations can
/// be checked exactly.
pub fn numbered(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            buf.set_pixel(x, y, [(i % 256) as u8, (i / 256) as u8, 7, 255]);
        }
    }
    buf
}

/// Opaque diagonal grey gradient.
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height);
    let span = (width + height).saturating_sub(2).max(1);
    for y in 0..height {
        for x in 0..width {
            let v = ((x + y) * 255 / span) as u8;
            buf.set_pixel(x, y, [v, v, v, 255]);
        }
    }
    buf
}

pub fn incoming(pixels: PixelBuffer) -> IncomingImage {
    IncomingImage {
        pixels,
        byte_size: SMALL_FILE,
    }
}
