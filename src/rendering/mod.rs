pub mod geometry;
pub mod png_io;

pub use geometry::{resample_nearest, rotate, QuarterTurn};
pub use png_io::{decode_png, encode_png};
