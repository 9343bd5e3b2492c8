use image::ImageFormat;

use crate::error::HandlerError;

/// Format of an image as sniffed from its leading bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedFormat {
    pub format: ImageFormat,
    pub content_type: &'static str,
    pub extension: String,
}

pub(crate) const SUPPORTED: &[(ImageFormat, &str)] = &[
    (ImageFormat::Jpeg, "image/jpeg"),
    (ImageFormat::Png, "image/png"),
    (ImageFormat::Gif, "image/gif"),
    (ImageFormat::WebP, "image/webp"),
    (ImageFormat::Bmp, "image/bmp"),
    (ImageFormat::Tiff, "image/tiff"),
    (ImageFormat::Ico, "image/x-icon"),
];

/// Detects the format from content, ignoring any declared content type.
pub fn detect(bytes: &[u8]) -> Result<DetectedFormat, HandlerError> {
    let format = image::guess_format(bytes).map_err(|_| HandlerError::UnsupportedFormat)?;
    let content_type = SUPPORTED
        .iter()
        .find(|(supported, _)| *supported == format)
        .map(|(_, mime)| *mime)
        .ok_or(HandlerError::UnsupportedFormat)?;

    Ok(DetectedFormat {
        format,
        content_type,
        extension: extension_label(content_type),
    })
}

/// Upper-cased mime subtype, with the two names encoders spell differently.
pub fn extension_label(content_type: &str) -> String {
    let upper = content_type.to_ascii_uppercase();
    let label = upper.strip_prefix("IMAGE/").unwrap_or(&upper);
    match label {
        "JPX" => "JPEG2000".to_string(),
        "X-ICON" => "ICO".to_string(),
        other => other.to_string(),
    }
}
