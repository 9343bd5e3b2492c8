use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::HandlerError;
use crate::format::{detect, DetectedFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedImage {
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub extension: String,
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

/// Dimensions after fitting `original` into `max_width`, keeping aspect ratio.
///
/// Images already narrower than `max_width` are left alone; the scaled height
/// is floored but never reaches zero.
pub fn target_dimensions(max_width: u32, original: (u32, u32)) -> (u32, u32) {
    let (width, height) = original;
    if width == 0 || max_width >= width {
        return original;
    }
    let scaled = u64::from(max_width) * u64::from(height) / u64::from(width);
    (max_width, u32::try_from(scaled).unwrap_or(u32::MAX).max(1))
}

/// Size of the optimized payload relative to the original; zero for an empty original.
pub fn optimization_ratio(optimized: usize, original: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        optimized as f64 / original as f64
    }
}

pub fn optimize_image(bytes: &[u8], max_width: u32, quality: u8) -> Result<OptimizedImage, HandlerError> {
    let DetectedFormat {
        format,
        content_type,
        extension,
    } = detect(bytes)?;

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|error| HandlerError::Decode(error.to_string()))?;

    let (width, height) = target_dimensions(max_width, decoded.dimensions());
    let resized = if (width, height) == decoded.dimensions() {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::CatmullRom)
    };

    let data = encode(&resized, format, quality)?;
    let ratio = optimization_ratio(data.len(), bytes.len());

    Ok(OptimizedImage {
        data,
        content_type,
        extension,
        width,
        height,
        ratio,
    })
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, HandlerError> {
    let mut out = Cursor::new(Vec::new());
    let written = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut out, quality);
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilterType::Adaptive);
            image.write_with_encoder(encoder)
        }
        other => image.write_to(&mut out, other),
    };
    written.map_err(|error| HandlerError::Encode(error.to_string()))?;
    Ok(out.into_inner())
}
