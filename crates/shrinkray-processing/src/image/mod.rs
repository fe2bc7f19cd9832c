//! Image processing module
//!
//! - `processor`: format detection, dimensions and decode validation
//! - `transformer`: the halving resize and JPEG encoding

pub mod processor;
pub mod transformer;

pub use processor::ImageProcessor;
pub use transformer::{HalvedImage, ImageTransformer, ResizeError};
