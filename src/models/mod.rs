pub mod config;
pub mod decision;
pub mod parameters;
pub mod pixel_buffer;
pub mod view;

pub use config::PipelineConfig;
pub use decision::{NegotiationState, PendingDecision, Resolution, Trigger, UserChoice};
pub use parameters::{
    ParamField, ParamValue, PipelineParameters, Variant, VariantDescriptor, VARIANT_TABLE,
};
pub use pixel_buffer::PixelBuffer;
pub use view::ViewTransform;
