use imaginex_core::source::FetchedImage;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::adapters::download::ImageDownloader;

// Caps how much a declared Content-Length may preallocate.
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct HttpImageDownloader {
    client: reqwest::Client,
}

impl HttpImageDownloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ImageDownloader for HttpImageDownloader {
    fn download(&self, url: &Url, chunk_size: usize) -> Result<FetchedImage, String> {
        let client = self.client.clone();
        let target = url.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut response = client
                    .get(target)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|error| format!("failed to download image: {error}"))?;

                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let content_size = response.content_length();

                let capacity = content_size
                    .map(|size| size.min(MAX_PREALLOCATION) as usize)
                    .unwrap_or(chunk_size);
                let mut bytes = Vec::with_capacity(capacity);
                while let Some(chunk) = response
                    .chunk()
                    .await
                    .map_err(|error| format!("failed to read image body: {error}"))?
                {
                    bytes.extend_from_slice(&chunk);
                }

                Ok(FetchedImage {
                    bytes,
                    content_type,
                    content_size,
                })
            })
        })
    }
}
