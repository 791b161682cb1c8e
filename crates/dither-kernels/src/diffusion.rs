//! Two-level error diffusion over luminance.

use crate::kernel::Kernel;
use crate::luma;

/// Error-diffuse the image to black/white using `kernel`.
///
/// With `block_scale > 1` diffusion runs on a grid of block means and each
/// result is painted back over its whole block.
pub fn diffuse(
    data: &mut [u8],
    width: usize,
    height: usize,
    threshold: u8,
    kernel: &Kernel,
    block_scale: u32,
) {
    let bs = block_scale.max(1) as usize;
    let grid_w = width.div_ceil(bs);
    let grid_h = height.div_ceil(bs);

    let mut grid = vec![0.0f32; grid_w * grid_h];
    for (gy, row) in grid.chunks_exact_mut(grid_w.max(1)).enumerate() {
        for (gx, cell) in row.iter_mut().enumerate() {
            let (x0, x1) = (gx * bs, ((gx + 1) * bs).min(width));
            let (y0, y1) = (gy * bs, ((gy + 1) * bs).min(height));
            let mut sum = 0.0;
            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = (y * width + x) * 4;
                    sum += luma(&data[idx..idx + 4]);
                }
            }
            *cell = sum / ((x1 - x0) * (y1 - y0)) as f32;
        }
    }

    let divisor = kernel.divisor as f32;
    for gy in 0..grid_h {
        for gx in 0..grid_w {
            let idx = gy * grid_w + gx;
            let old = grid[idx];
            let new = if old < threshold as f32 { 0.0 } else { 255.0 };
            let error = old - new;
            grid[idx] = new;
            for &(dx, dy, weight) in kernel.entries {
                let nx = gx as i64 + dx as i64;
                let ny = gy as i64 + dy as i64;
                if nx >= 0 && nx < grid_w as i64 && ny < grid_h as i64 {
                    grid[ny as usize * grid_w + nx as usize] += error * weight as f32 / divisor;
                }
            }
        }
    }

    for y in 0..height {
        for x in 0..width {
            let v = grid[(y / bs) * grid_w + x / bs].round().clamp(0.0, 255.0) as u8;
            let idx = (y * width + x) * 4;
            data[idx..idx + 3].fill(v);
        }
    }
}
