use anyhow::{Context, Result};
use arfoto_core::constants::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_IMAGE_WIDTH, OUTPUT_CONTENT_TYPE};
use arfoto_core::{CompressedAsset, PipelineConfig, PipelineError};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageDecoder};
use std::io::Cursor;

/// Select a resampling filter based on the downscale ratio
pub fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Downscales photos to a maximum width and re-encodes them as JPEG
#[derive(Debug, Clone, Copy)]
pub struct ImageCompressor {
    max_width: u32,
    quality: u8,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_WIDTH, DEFAULT_JPEG_QUALITY)
    }
}

impl ImageCompressor {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self {
            max_width: max_width.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_image_width, config.jpeg_quality)
    }

    /// Output dimensions: never wider than `max_width`, aspect ratio kept.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width {
            return (width, height);
        }
        let scaled = (height as f64 * self.max_width as f64 / width as f64).round() as u32;
        (self.max_width, scaled.max(1))
    }

    /// Decode, resize and encode synchronously. CPU-bound.
    ///
    /// The EXIF orientation is applied before sizing, so portrait camera shots
    /// stored as landscape sensor data come out upright. The output carries no
    /// EXIF.
    pub fn compress_blocking(&self, data: &[u8]) -> Result<CompressedAsset> {
        let mut decoder = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .context("Failed to sniff image format")?
            .into_decoder()
            .context("Failed to decode image")?;
        let orientation = decoder
            .orientation()
            .context("Failed to read image orientation")?;
        let mut img = DynamicImage::from_decoder(decoder).context("Failed to decode image")?;
        img.apply_orientation(orientation);

        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = self.target_dimensions(orig_width, orig_height);

        let img = if (width, height) == (orig_width, orig_height) {
            img
        } else {
            let filter = select_filter(orig_width, orig_height, width, height);
            tracing::debug!(
                from_width = orig_width,
                from_height = orig_height,
                to_width = width,
                to_height = height,
                ?filter,
                "Downscaling image"
            );
            img.resize_exact(width, height, filter)
        };

        let data = self.encode_jpeg(&img)?;
        Ok(CompressedAsset {
            size: data.len() as u64,
            data,
            content_type: OUTPUT_CONTENT_TYPE,
            width,
            height,
        })
    }

    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Bytes> {
        // JPEG has no alpha channel.
        let rgb = img.to_rgb8();
        let mut buffer = Vec::with_capacity((rgb.width() * rgb.height()) as usize / 4);
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .encode_image(&rgb)
            .context("Failed to encode JPEG")?;
        Ok(Bytes::from(buffer))
    }

    /// Compress off the async scheduler.
    pub async fn compress(&self, data: Bytes) -> Result<CompressedAsset, PipelineError> {
        let compressor = *self;
        tokio::task::spawn_blocking(move || compressor.compress_blocking(&data))
            .await
            .map_err(|e| PipelineError::DecodeError(format!("compression task failed: {}", e)))?
            .map_err(|e| PipelineError::DecodeError(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 90, 128]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    #[test]
    fn test_target_dimensions() {
        let compressor = ImageCompressor::default();
        assert_eq!(compressor.target_dimensions(4000, 3000), (1920, 1440));
        assert_eq!(compressor.target_dimensions(1920, 1080), (1920, 1080));
        assert_eq!(compressor.target_dimensions(500, 400), (500, 400));
        assert_eq!(compressor.target_dimensions(3000, 1001), (1920, 641));
        assert_eq!(compressor.target_dimensions(100_000, 10), (1920, 1));
    }

    #[test]
    fn test_select_filter() {
        assert_eq!(select_filter(4000, 3000, 1920, 1440), FilterType::Triangle);
        assert_eq!(select_filter(3000, 2000, 1920, 1280), FilterType::CatmullRom);
        assert_eq!(select_filter(2400, 1600, 1920, 1280), FilterType::Lanczos3);
    }

    #[test]
    fn test_png_with_alpha_becomes_jpeg() {
        let compressor = ImageCompressor::new(64, 85);
        let asset = compressor
            .compress_blocking(&encode(128, 32, ImageFormat::Png))
            .unwrap();

        assert_eq!(asset.content_type, "image/jpeg");
        assert_eq!((asset.width, asset.height), (64, 16));
        assert_eq!(asset.size, asset.data.len() as u64);
        assert_eq!(
            image::guess_format(&asset.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    fn encode_jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 200]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    /// Splice an APP1 Exif segment holding only an Orientation tag right after
    /// the SOI marker of a baseline JPEG.
    fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"MM\0*");
        tiff.extend_from_slice(&8u32.to_be_bytes());
        tiff.extend_from_slice(&1u16.to_be_bytes());
        // Tag 0x0112, type SHORT, count 1, value left-aligned in the offset field.
        tiff.extend_from_slice(&0x0112u16.to_be_bytes());
        tiff.extend_from_slice(&3u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_be_bytes());

        let mut segment = b"Exif\0\0".to_vec();
        segment.extend_from_slice(&tiff);

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((segment.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&segment);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_exif_rotation_is_applied_before_resize() {
        let compressor = ImageCompressor::new(300, 85);
        let sideways = with_exif_orientation(&encode_jpeg_fixture(800, 600), 6);

        let asset = compressor.compress_blocking(&sideways).unwrap();

        assert_eq!((asset.width, asset.height), (300, 400));
        let output = image::load_from_memory(&asset.data).unwrap();
        assert_eq!((output.width(), output.height()), (300, 400));
    }

    #[test]
    fn test_upright_exif_keeps_dimensions() {
        let compressor = ImageCompressor::new(1000, 85);
        let upright = with_exif_orientation(&encode_jpeg_fixture(400, 300), 1);

        let asset = compressor.compress_blocking(&upright).unwrap();
        assert_eq!((asset.width, asset.height), (400, 300));
    }

    #[tokio::test]
    async fn test_garbage_is_decode_error() {
        let compressor = ImageCompressor::default();
        let result = compressor
            .compress(Bytes::from_static(b"definitely not an image"))
            .await;
        assert!(matches!(result, Err(PipelineError::DecodeError(_))));
    }
}
