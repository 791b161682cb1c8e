//! dither-kernels: in-place RGBA dithering
//!
//! A single entry point, [`apply_dither`], quantizes an RGBA8 buffer to black
//! and white using one of the named [`VARIANTS`]. The buffer is modified in
//! place and never resized; identical inputs always give identical output.
//!
//! # Processing order
//!
//! 1. RGB is premultiplied by alpha.
//! 2. Box blur (`blur` radius), block pixelation (`pixelation` > 1) and a
//!    contrast/gamma tone curve are applied.
//! 3. The variant quantizes luminance (`0.299 R + 0.587 G + 0.114 B`).
//! 4. Every pixel that was not fully opaque gets its original RGBA back, so
//!    only opaque pixels (where premultiplying is a no-op) carry the result.
//!
//! ```
//! use dither_kernels::{apply_dither, DitherParams};
//!
//! let mut data = vec![90u8, 90, 90, 255].repeat(4);
//! let params = DitherParams::default();
//! apply_dither("threshold", &mut data, 2, 2, &params).unwrap();
//! assert!(data.chunks_exact(4).all(|px| px[0] == 0 || px[0] == 255));
//! ```

mod diffusion;
mod error;
pub mod kernel;
mod ordered;
mod preprocess;

pub use error::DitherError;
pub use ordered::bayer_matrix;

use kernel::Kernel;

/// Names accepted by [`apply_dither`].
pub const VARIANTS: &[&str] = &[
    "threshold",
    "floyd-steinberg",
    "bayer",
    "jarvis",
    "atkinson",
    "sierra",
    "sierra-two-row",
    "sierra-lite",
];

/// Numeric knobs shared by all variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherParams {
    /// Luminance cut-off for threshold and error diffusion variants
    pub threshold: u8,
    /// Contrast in percent around mid-grey (100 = unchanged)
    pub contrast: f32,
    /// Gamma exponent, must be positive
    pub gamma: f32,
    /// Pixelation block size (values below 2 disable it)
    pub pixelation: u32,
    /// Box blur radius
    pub blur: u32,
    /// Quantization block size
    pub block_scale: u32,
    /// Ordered-dither matrix size, required by `bayer` and ignored otherwise
    pub matrix: Option<(u8, u8)>,
}

impl Default for DitherParams {
    fn default() -> Self {
        Self {
            threshold: 128,
            contrast: 100.0,
            gamma: 1.0,
            pixelation: 0,
            blur: 0,
            block_scale: 1,
            matrix: None,
        }
    }
}

enum Quantizer {
    Threshold,
    Ordered,
    Diffusion(&'static Kernel),
}

fn quantizer_for(variant: &str) -> Option<Quantizer> {
    let q = match variant {
        "threshold" => Quantizer::Threshold,
        "bayer" => Quantizer::Ordered,
        "floyd-steinberg" => Quantizer::Diffusion(&kernel::FLOYD_STEINBERG),
        "jarvis" => Quantizer::Diffusion(&kernel::JARVIS_JUDICE_NINKE),
        "atkinson" => Quantizer::Diffusion(&kernel::ATKINSON),
        "sierra" => Quantizer::Diffusion(&kernel::SIERRA),
        "sierra-two-row" => Quantizer::Diffusion(&kernel::SIERRA_TWO_ROW),
        "sierra-lite" => Quantizer::Diffusion(&kernel::SIERRA_LITE),
        _ => return None,
    };
    Some(q)
}

/// Rec. 601 luma of an RGBA pixel.
#[inline]
pub(crate) fn luma(px: &[u8]) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

/// Dither `data` (RGBA8, row-major, `width * height * 4` bytes) in place.
///
/// # Errors
///
/// - [`DitherError::UnknownVariant`] if `variant` is not in [`VARIANTS`]
/// - [`DitherError::MissingMatrix`] if `bayer` is requested without
///   `params.matrix`
/// - [`DitherError::BufferSize`] if the buffer length is wrong
///
/// The buffer is untouched when an error is returned.
pub fn apply_dither(
    variant: &str,
    data: &mut [u8],
    width: u32,
    height: u32,
    params: &DitherParams,
) -> Result<(), DitherError> {
    let quantizer =
        quantizer_for(variant).ok_or_else(|| DitherError::UnknownVariant(variant.to_string()))?;
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(DitherError::BufferSize {
            expected,
            actual: data.len(),
        });
    }
    if matches!(quantizer, Quantizer::Ordered) && params.matrix.is_none() {
        return Err(DitherError::MissingMatrix);
    }

    let w = width as usize;
    let h = height as usize;
    let backup = data.to_vec();

    for px in data.chunks_exact_mut(4) {
        let a = px[3] as f32 / 255.0;
        for c in &mut px[..3] {
            *c = (*c as f32 * a).round() as u8;
        }
    }

    preprocess::preprocess(
        data,
        w,
        h,
        params.contrast,
        params.gamma,
        params.pixelation,
        params.blur,
    );

    match quantizer {
        Quantizer::Threshold => ordered::threshold(data, params.threshold),
        Quantizer::Ordered => {
            let (mw, mh) = params.matrix.unwrap_or((4, 4));
            ordered::ordered(data, w, h, params.block_scale, mw, mh);
        }
        Quantizer::Diffusion(k) => {
            diffusion::diffuse(data, w, h, params.threshold, k, params.block_scale)
        }
    }

    for (px, orig) in data.chunks_exact_mut(4).zip(backup.chunks_exact(4)) {
        if orig[3] != 255 {
            px.copy_from_slice(orig);
        }
    }
    Ok(())
}
