//! Tone and structure adjustments applied before quantization.
//!
//! Order is fixed: box blur, block pixelation, then the contrast/gamma
//! lookup table. Alpha is never touched.

/// Summed-area tables for the R, G and B channels.
struct Integral {
    width: usize,
    channels: [Vec<u64>; 3],
}

impl Integral {
    fn new(data: &[u8], width: usize, height: usize) -> Self {
        let mut channels = [
            vec![0u64; width * height],
            vec![0u64; width * height],
            vec![0u64; width * height],
        ];
        for y in 0..height {
            let mut row = [0u64; 3];
            for x in 0..width {
                let idx = y * width + x;
                for (c, table) in channels.iter_mut().enumerate() {
                    row[c] += data[idx * 4 + c] as u64;
                    let above = if y > 0 { table[idx - width] } else { 0 };
                    table[idx] = row[c] + above;
                }
            }
        }
        Self { width, channels }
    }

    /// Per-channel mean over the inclusive rectangle (x0, y0)..=(x1, y1).
    fn mean(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> [u8; 3] {
        let area = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
        let w = self.width;
        let mut out = [0u8; 3];
        for (c, table) in self.channels.iter().enumerate() {
            let d = table[y1 * w + x1];
            let a = if x0 > 0 && y0 > 0 {
                table[(y0 - 1) * w + (x0 - 1)]
            } else {
                0
            };
            let b = if y0 > 0 { table[(y0 - 1) * w + x1] } else { 0 };
            let l = if x0 > 0 { table[y1 * w + (x0 - 1)] } else { 0 };
            out[c] = ((d + a - b - l) / area) as u8;
        }
        out
    }
}

/// Box blur with the given radius (0 disables it).
pub fn blur(data: &mut [u8], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let integral = Integral::new(data, width, height);
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);
            let idx = (y * width + x) * 4;
            data[idx..idx + 3].copy_from_slice(&integral.mean(x0, y0, x1, y1));
        }
    }
}

/// Replace every `block` × `block` tile with its mean colour. Sizes below
/// two leave the image unchanged.
pub fn pixelate(data: &mut [u8], width: usize, height: usize, block: usize) {
    if block < 2 || width == 0 || height == 0 {
        return;
    }
    let integral = Integral::new(data, width, height);
    for y0 in (0..height).step_by(block) {
        let y1 = (y0 + block - 1).min(height - 1);
        for x0 in (0..width).step_by(block) {
            let x1 = (x0 + block - 1).min(width - 1);
            let mean = integral.mean(x0, y0, x1, y1);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let idx = (y * width + x) * 4;
                    data[idx..idx + 3].copy_from_slice(&mean);
                }
            }
        }
    }
}

/// Build the 256-entry contrast + gamma lookup table.
///
/// `contrast` is a percentage around mid-grey (100 = unchanged, negative
/// values invert); `gamma` must be positive.
pub fn tone_curve(contrast: f32, gamma: f32) -> [u8; 256] {
    let factor = contrast / 100.0;
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let contrasted = (i as f32 - 128.0) * factor + 128.0;
        let normalized = (contrasted / 255.0).clamp(0.0, 1.0);
        let corrected = 255.0 * normalized.powf(1.0 / gamma);
        *slot = corrected.clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Run all adjustment stages in order.
pub fn preprocess(
    data: &mut [u8],
    width: usize,
    height: usize,
    contrast: f32,
    gamma: f32,
    pixelation: u32,
    blur_radius: u32,
) {
    blur(data, width, height, blur_radius as usize);
    pixelate(data, width, height, pixelation as usize);
    let lut = tone_curve(contrast, gamma);
    for px in data.chunks_exact_mut(4) {
        px[0] = lut[px[0] as usize];
        px[1] = lut[px[1] as usize];
        px[2] = lut[px[2] as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 0 } else { 200 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        data
    }

    #[test]
    fn test_identity_tone_curve() {
        let lut = tone_curve(100.0, 1.0);
        for (i, &v) in lut.iter().enumerate() {
            assert!((v as i32 - i as i32).abs() <= 1, "{i} -> {v}");
        }
    }

    #[test]
    fn test_zero_contrast_flattens_to_mid_grey() {
        let lut = tone_curve(0.0, 1.0);
        assert!(lut.iter().all(|&v| v == lut[0]));
        assert!((127..=128).contains(&lut[0]));
    }

    #[test]
    fn test_pixelate_averages_tiles() {
        let mut data = checker(4, 4);
        pixelate(&mut data, 4, 4, 2);
        for px in data.chunks_exact(4) {
            assert_eq!(px, &[100, 100, 100, 255]);
        }
    }

    #[test]
    fn test_pixelate_below_two_is_noop() {
        let mut data = checker(3, 3);
        let before = data.clone();
        pixelate(&mut data, 3, 3, 1);
        assert_eq!(data, before);
    }

    #[test]
    fn test_blur_keeps_alpha() {
        let mut data = checker(5, 5);
        for px in data.chunks_exact_mut(4) {
            px[3] = 77;
        }
        blur(&mut data, 5, 5, 1);
        assert!(data.chunks_exact(4).all(|px| px[3] == 77));
        // Centre pixel averages a 3x3 window of 5 zeros and 4 x 200
        let centre = (2 * 5 + 2) * 4;
        assert_eq!(data[centre], 88);
    }

    #[test]
    fn test_large_white_image_sums_do_not_overflow() {
        // 4200 x 4100 x 255 is above u32::MAX
        let (w, h) = (4200, 4100);
        let mut data = vec![255u8; w * h * 4];
        pixelate(&mut data, w, h, 5);
        blur(&mut data, w, h, 1);
        assert!(data.iter().all(|&v| v == 255));
    }
}
