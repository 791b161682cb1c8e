use std::sync::Arc;

use dither_kernels::{apply_dither, DitherError, DitherParams};

use crate::error::TransformError;
use crate::models::{PipelineParameters, PixelBuffer};

/// Arguments passed to a pixel-transform capability. `matrix` is only ever
/// `Some` for variants whose descriptor declares it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformArgs {
    pub threshold: u8,
    pub contrast: f32,
    pub gamma: f32,
    pub pixelation: u32,
    pub blur: u32,
    pub block_scale: u32,
    pub matrix: Option<(u8, u8)>,
}

/// External in-place pixel transform. Must be deterministic and must not
/// resize the buffer.
pub trait PixelTransform: Send + Sync {
    fn transform(
        &self,
        variant: &str,
        data: &mut [u8],
        width: u32,
        height: u32,
        args: &TransformArgs,
    ) -> Result<(), TransformError>;
}

/// Capability backed by the `dither-kernels` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelTransform;

impl PixelTransform for KernelTransform {
    fn transform(
        &self,
        variant: &str,
        data: &mut [u8],
        width: u32,
        height: u32,
        args: &TransformArgs,
    ) -> Result<(), TransformError> {
        let params = DitherParams {
            threshold: args.threshold,
            contrast: args.contrast,
            gamma: args.gamma,
            pixelation: args.pixelation,
            blur: args.blur,
            block_scale: args.block_scale,
            matrix: args.matrix,
        };
        apply_dither(variant, data, width, height, &params).map_err(|e| match e {
            DitherError::UnknownVariant(name) => TransformError::UnknownVariant(name),
            other => TransformError::Rejected(other.to_string()),
        })
    }
}

/// Calls the capability with the argument subset the selected variant uses.
#[derive(Clone)]
pub struct TransformInvoker {
    capability: Arc<dyn PixelTransform>,
}

impl TransformInvoker {
    pub fn new(capability: Arc<dyn PixelTransform>) -> Self {
        Self { capability }
    }

    /// Build the arguments for `params.variant`.
    pub fn arguments(params: &PipelineParameters) -> TransformArgs {
        let descriptor = params.variant.descriptor();
        TransformArgs {
            threshold: params.threshold,
            contrast: params.contrast,
            gamma: params.gamma,
            pixelation: params.pixelation,
            blur: params.blur,
            block_scale: params.block_scale,
            matrix: descriptor
                .takes_matrix
                .then_some((params.matrix_width, params.matrix_height)),
        }
    }

    /// Transform `buffer` in place.
    ///
    /// # Panics
    ///
    /// Panics if the capability does not recognise the variant name. The
    /// variant set is closed, so this can only be a programming error.
    pub fn run(
        &self,
        params: &PipelineParameters,
        buffer: &mut PixelBuffer,
    ) -> Result<(), TransformError> {
        let args = Self::arguments(params);
        let (width, height) = buffer.dimensions();
        tracing::debug!(
            variant = %params.variant,
            width,
            height,
            matrix = ?args.matrix,
            "Invoking pixel transform"
        );
        match self
            .capability
            .transform(params.variant.name(), buffer.data_mut(), width, height, &args)
        {
            Err(TransformError::UnknownVariant(name)) => {
                panic!("pixel transform does not know variant {name:?}")
            }
            other => other,
        }
    }
}

impl Default for TransformInvoker {
    fn default() -> Self {
        Self::new(Arc::new(KernelTransform))
    }
}
