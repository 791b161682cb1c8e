//! Assertion helpers for tests.

use pretty_assertions::assert_eq;

use dither_live::models::PixelBuffer;

/// Assert bytes are a PNG and return the decoded image.
pub fn assert_png(bytes: &[u8]) -> PixelBuffer {
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
    dither_live::rendering::decode_png(bytes).expect("PNG should decode")
}

/// Assert every opaque pixel is pure black or pure white.
pub fn assert_black_and_white(image: &PixelBuffer) {
    for (i, px) in image.data().chunks_exact(4).enumerate() {
        if px[3] != 255 {
            continue;
        }
        assert!(
            px[..3] == [0, 0, 0] || px[..3] == [255, 255, 255],
            "pixel {i} is {:?}, expected black or white",
            px
        );
    }
}

/// Assert the RGB of a one-row image, ignoring alpha.
pub fn assert_row_rgb(image: &PixelBuffer, expected: &[[u8; 3]]) {
    let actual: Vec<[u8; 3]> = image
        .data()
        .chunks_exact(4)
        .map(|px| [px[0], px[1], px[2]])
        .collect();
    assert_eq!(actual, expected.to_vec());
}
