pub const UNPROCESSABLE: u16 = 422;
pub const INTERNAL: u16 = 500;

/// Failure of a single optimize request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("{0}")]
    Misconfiguration(String),
    #[error("{0}")]
    Fetch(String),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::UnsupportedFormat => UNPROCESSABLE,
            Self::Misconfiguration(_) | Self::Fetch(_) | Self::Decode(_) | Self::Encode(_) => {
                INTERNAL
            }
        }
    }
}
