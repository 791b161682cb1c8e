use std::io::Cursor;

use crate::error::PipelineError;
use crate::models::PixelBuffer;

/// Decode a PNG into RGBA8. Palette, greyscale and 16-bit images are
/// expanded; images without alpha become fully opaque.
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer, PipelineError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| PipelineError::PngDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| PipelineError::PngDecode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => {
            // EXPAND should have removed palettes
            return Err(PipelineError::PngDecode(
                "indexed color was not expanded".to_string(),
            ));
        }
    };
    PixelBuffer::from_rgba(info.width, info.height, rgba)
}

/// Encode an RGBA8 buffer as PNG.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| PipelineError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(image.data())
            .map_err(|e| PipelineError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_rgba() {
        let mut image = PixelBuffer::filled(3, 2, [10, 20, 30, 255]);
        image.set_pixel(2, 1, [200, 100, 50, 128]);
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(decode_png(&bytes).unwrap(), image);
    }

    #[test]
    fn test_decode_grayscale_expands() {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 200]).unwrap();
        }
        let image = decode_png(&bytes).unwrap();
        assert_eq!(image.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(image.pixel(1, 0), [200, 200, 200, 255]);
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_png(b"not a png").unwrap_err();
        assert!(matches!(err, PipelineError::PngDecode(_)));
    }
}
