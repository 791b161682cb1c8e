use crate::models::PixelBuffer;

/// Clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl QuarterTurn {
    /// Fold any multiple of 90 degrees (signed) into a turn. Angles that
    /// are not multiples of 90 snap to the nearest one.
    pub fn from_degrees(angle: i32) -> Self {
        let snapped = ((angle as f64 / 90.0).round() as i64).rem_euclid(4);
        match snapped {
            1 => QuarterTurn::Quarter,
            2 => QuarterTurn::Half,
            3 => QuarterTurn::ThreeQuarter,
            _ => QuarterTurn::None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            QuarterTurn::None => 0,
            QuarterTurn::Quarter => 90,
            QuarterTurn::Half => 180,
            QuarterTurn::ThreeQuarter => 270,
        }
    }

    /// Whether the turn swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, QuarterTurn::Quarter | QuarterTurn::ThreeQuarter)
    }

    pub fn rotated_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Rotate `src` clockwise by `turn`. Pixels move exactly; nothing is
/// resampled.
pub fn rotate(src: &PixelBuffer, turn: QuarterTurn) -> PixelBuffer {
    if turn == QuarterTurn::None {
        return src.clone();
    }
    let (w, h) = src.dimensions();
    let (dw, dh) = turn.rotated_dimensions(w, h);
    let mut dst = PixelBuffer::new(dw, dh);
    for dy in 0..dh {
        for dx in 0..dw {
            let (sx, sy) = match turn {
                QuarterTurn::Quarter => (dy, h - 1 - dx),
                QuarterTurn::Half => (w - 1 - dx, h - 1 - dy),
                QuarterTurn::ThreeQuarter => (w - 1 - dy, dx),
                QuarterTurn::None => (dx, dy),
            };
            dst.set_pixel(dx, dy, src.pixel(sx, sy));
        }
    }
    dst
}

/// Nearest-neighbour resample to `width` x `height`.
///
/// Output pixel `(x, y)` reads the source pixel whose centre is nearest to
/// the scaled centre of `(x, y)`.
pub fn resample_nearest(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    let mut dst = PixelBuffer::new(width, height);
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return dst;
    }
    let x_map: Vec<u32> = (0..width).map(|x| nearest(x, width, sw)).collect();
    for y in 0..height {
        let sy = nearest(y, height, sh);
        for (x, &sx) in x_map.iter().enumerate() {
            dst.set_pixel(x as u32, y, src.pixel(sx, sy));
        }
    }
    dst
}

fn nearest(i: u32, dst_len: u32, src_len: u32) -> u32 {
    let pos = ((i as f64 + 0.5) * src_len as f64 / dst_len as f64).floor() as u32;
    pos.min(src_len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 buffer where each pixel's red channel is its index.
    fn indexed(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, [(y * width + x) as u8, 0, 0, 255]);
            }
        }
        buf
    }

    fn reds(buf: &PixelBuffer) -> Vec<u8> {
        buf.data().chunks_exact(4).map(|px| px[0]).collect()
    }

    #[test]
    fn test_from_degrees() {
        assert_eq!(QuarterTurn::from_degrees(0), QuarterTurn::None);
        assert_eq!(QuarterTurn::from_degrees(90), QuarterTurn::Quarter);
        assert_eq!(QuarterTurn::from_degrees(-90), QuarterTurn::ThreeQuarter);
        assert_eq!(QuarterTurn::from_degrees(-180), QuarterTurn::Half);
        assert_eq!(QuarterTurn::from_degrees(450), QuarterTurn::Quarter);
        assert_eq!(QuarterTurn::from_degrees(100), QuarterTurn::Quarter);
        assert_eq!(QuarterTurn::from_degrees(-360), QuarterTurn::None);
    }

    #[test]
    fn test_rotate_quarter() {
        // 0 1 2      3 0
        // 3 4 5  ->  4 1
        //            5 2
        let out = rotate(&indexed(3, 2), QuarterTurn::Quarter);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(reds(&out), vec![3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn test_rotate_three_quarter() {
        // 0 1 2      2 5
        // 3 4 5  ->  1 4
        //            0 3
        let out = rotate(&indexed(3, 2), QuarterTurn::ThreeQuarter);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(reds(&out), vec![2, 5, 1, 4, 0, 3]);
    }

    #[test]
    fn test_rotate_half() {
        let out = rotate(&indexed(3, 2), QuarterTurn::Half);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(reds(&out), vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_four_quarters_is_identity() {
        let src = indexed(5, 3);
        let mut out = src.clone();
        for _ in 0..4 {
            out = rotate(&out, QuarterTurn::Quarter);
        }
        assert_eq!(out, src);
    }

    #[test]
    fn test_resample_identity() {
        let src = indexed(4, 4);
        assert_eq!(resample_nearest(&src, 4, 4), src);
    }

    #[test]
    fn test_resample_halves() {
        let out = resample_nearest(&indexed(4, 2), 2, 1);
        // centres at source x = 1 and 3, y = 1
        assert_eq!(reds(&out), vec![5, 7]);
    }

    #[test]
    fn test_resample_upscale() {
        let out = resample_nearest(&indexed(2, 1), 4, 1);
        assert_eq!(reds(&out), vec![0, 0, 1, 1]);
    }
}
