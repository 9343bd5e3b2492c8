use url::Url;

/// Where the original image is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(Url),
    S3Key(String),
}

impl ImageSource {
    /// URLs with a host are downloaded; anything else is an object key.
    pub fn classify(raw: &str) -> Self {
        let candidate = if raw.starts_with("//") {
            format!("https:{raw}")
        } else {
            raw.to_string()
        };

        match Url::parse(&candidate) {
            Ok(url) if url.host().is_some() && has_authority(&candidate) => Self::Remote(url),
            _ => Self::S3Key(raw.trim_matches('/').to_string()),
        }
    }
}

// The url crate fills in a host for `http:/foo`; only `scheme://` carries one.
fn has_authority(raw: &str) -> bool {
    raw.split_once(':')
        .is_some_and(|(_, rest)| rest.starts_with("//"))
}

/// Raw image bytes plus whatever the origin declared about them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub content_size: Option<u64>,
}

impl FetchedImage {
    pub fn original_size(&self) -> usize {
        self.bytes.len()
    }
}
