//! Shrinkray Processing Library
//!
//! Image decoding, halving and JPEG re-encoding, plus the payload checks
//! applied before an image is decoded.

pub mod image;
pub mod metadata;
pub mod validator;

pub use crate::image::{HalvedImage, ImageProcessor, ImageTransformer, ResizeError};
pub use metadata::ImageMetadata;
pub use validator::{PayloadValidator, ValidationError};
