//! dither-live - live dithering pipeline
//!
//! Loads an image, runs it through a pixel-transform capability with
//! user-tuned parameters, and presents the result. Large images are gated
//! behind a downscale prompt; bursts of parameter changes coalesce into one
//! recomputation per frame.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
