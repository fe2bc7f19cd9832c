//! Image transformer - halves an image and re-encodes it as JPEG

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

/// JPEG quality used for processed images.
pub const JPEG_QUALITY: u8 = 75;

#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("failed to read image header: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("halving a {width}x{height} image leaves a zero-sized axis")]
    ZeroDimension { width: u32, height: u32 },

    #[error("failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Result of [`ImageTransformer::halve`].
#[derive(Debug, Clone)]
pub struct HalvedImage {
    /// JPEG-encoded output.
    pub data: Bytes,
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
}

pub struct ImageTransformer;

impl ImageTransformer {
    /// Output dimensions for a source image: each axis halved, rounding down.
    pub fn halved_dimensions(width: u32, height: u32) -> Result<(u32, u32), ResizeError> {
        let (target_width, target_height) = (width / 2, height / 2);
        if target_width == 0 || target_height == 0 {
            return Err(ResizeError::ZeroDimension { width, height });
        }
        Ok((target_width, target_height))
    }

    /// Decode any supported raster format, halve both axes with a Lanczos3
    /// filter and encode the result as JPEG.
    ///
    /// JPEG has no alpha channel, so the output is flattened to RGB.
    pub fn halve(data: &[u8]) -> Result<HalvedImage, ResizeError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()
            .map_err(ResizeError::Decode)?;

        let (source_width, source_height) = img.dimensions();
        let (width, height) = Self::halved_dimensions(source_width, source_height)?;

        let resized = img.resize_exact(width, height, FilterType::Lanczos3);
        let encoded = Self::encode_jpeg(&resized)?;

        tracing::debug!(
            source_width,
            source_height,
            width,
            height,
            size_bytes = encoded.len(),
            "Image halved"
        );

        Ok(HalvedImage {
            data: encoded,
            source_width,
            source_height,
            width,
            height,
        })
    }

    fn encode_jpeg(img: &DynamicImage) -> Result<Bytes, ResizeError> {
        let rgb = img.to_rgb8();
        let estimated_size = (rgb.width() * rgb.height()) as usize / 4;
        let mut buffer = Vec::with_capacity(estimated_size);

        JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(ResizeError::Encode)?;

        Ok(Bytes::from(buffer))
    }
}
