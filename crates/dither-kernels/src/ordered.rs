//! Point-wise quantizers: fixed threshold and ordered (matrix) dithering.

use crate::luma;

/// Generate a `width` × `height` ordered-dither matrix.
///
/// Ranks are placed greedily: 0 goes top-left, and each following rank goes
/// to the free cell with the largest toroidal Manhattan distance to every
/// already placed cell (first such cell in row-major order wins ties). For
/// 2×2 this reproduces the classic Bayer layout.
pub fn bayer_matrix(width: u8, height: u8) -> Vec<Vec<u16>> {
    let w = width.max(1) as usize;
    let h = height.max(1) as usize;
    let mut matrix = vec![vec![0u16; w]; h];
    let mut used = vec![vec![false; w]; h];
    used[0][0] = true;
    let mut placed = vec![(0usize, 0usize)];

    for rank in 1..w * h {
        let mut best_dist = -1i32;
        let mut best = (0, 0);
        for y in 0..h {
            for x in 0..w {
                if used[y][x] {
                    continue;
                }
                let nearest = placed
                    .iter()
                    .map(|&(py, px)| {
                        let dx = (x as i32 - px as i32).abs();
                        let dy = (y as i32 - py as i32).abs();
                        dx.min(w as i32 - dx) + dy.min(h as i32 - dy)
                    })
                    .min()
                    .unwrap_or(i32::MAX);
                if nearest > best_dist {
                    best_dist = nearest;
                    best = (y, x);
                }
            }
        }
        matrix[best.0][best.1] = rank as u16;
        used[best.0][best.1] = true;
        placed.push(best);
    }
    matrix
}

/// Quantize every pixel to black or white against a fixed threshold.
pub fn threshold(data: &mut [u8], threshold: u8) {
    for px in data.chunks_exact_mut(4) {
        let v = if luma(px) < threshold as f32 { 0 } else { 255 };
        px[..3].fill(v);
    }
}

/// Ordered dithering with a generated matrix.
///
/// With `block_scale > 1` each block is quantized as a whole: the block's mean
/// luminance is compared against the matrix cell under the block centre.
pub fn ordered(
    data: &mut [u8],
    width: usize,
    height: usize,
    block_scale: u32,
    matrix_width: u8,
    matrix_height: u8,
) {
    let matrix = bayer_matrix(matrix_width, matrix_height);
    let mat_h = matrix.len();
    let mat_w = matrix[0].len();
    let levels = (mat_w * mat_h) as f32;
    let cell_threshold = |x: usize, y: usize| {
        (matrix[y % mat_h][x % mat_w] as f32 + 0.5) / levels * 255.0
    };
    let bs = block_scale.max(1) as usize;

    for y0 in (0..height).step_by(bs) {
        let y1 = (y0 + bs).min(height);
        for x0 in (0..width).step_by(bs) {
            let x1 = (x0 + bs).min(width);
            let mut sum = 0.0;
            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = (y * width + x) * 4;
                    sum += luma(&data[idx..idx + 4]);
                }
            }
            let mean = sum / ((x1 - x0) * (y1 - y0)) as f32;
            let centre_x = x0 + (x1 - x0) / 2;
            let centre_y = y0 + (y1 - y0) / 2;
            let v = if mean < cell_threshold(centre_x, centre_y) {
                0
            } else {
                255
            };
            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = (y * width + x) * 4;
                    data[idx..idx + 3].fill(v);
                }
            }
        }
    }
}
