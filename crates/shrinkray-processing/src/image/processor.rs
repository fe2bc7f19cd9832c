//! Image processor - format detection and dimensions

use crate::metadata::ImageMetadata;
use image::{GenericImageView, ImageReader};
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode the image and report its dimensions and format.
    pub fn extract_metadata(data: &[u8]) -> Result<ImageMetadata, anyhow::Error> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());
        let img = reader.decode()?;
        let (width, height) = img.dimensions();

        Ok(ImageMetadata {
            width,
            height,
            format,
            size_bytes: data.len() as u64,
        })
    }

    /// Dimensions read from the image header, without decoding pixel data.
    pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_extract_metadata() {
        let image_data = create_test_image(100, 60);
        let metadata = ImageProcessor::extract_metadata(&image_data).unwrap();

        assert_eq!(metadata.width, 100);
        assert_eq!(metadata.height, 60);
        assert_eq!(metadata.format, "Png");
        assert_eq!(metadata.size_bytes, image_data.len() as u64);
    }

    #[test]
    fn test_extract_metadata_invalid_image() {
        assert!(ImageProcessor::extract_metadata(b"not an image").is_err());
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(
            ImageProcessor::dimensions(&create_test_image(31, 7)),
            Some((31, 7))
        );
        assert_eq!(ImageProcessor::dimensions(b"not an image"), None);
    }
}
