use std::time::Instant;

use imaginex_core::config::OptimizerConfig;
use imaginex_core::error::HandlerError;
use imaginex_core::optimize::{optimize_image, OptimizedImage};
use imaginex_core::request::{parse_event, OptimizeRequest};
use imaginex_core::response::{image_response, ApiGatewayResponse};
use imaginex_core::source::{FetchedImage, ImageSource};
use serde_json::{json, Value};

use crate::adapters::download::ImageDownloader;
use crate::adapters::object_store::ImageObjectStore;

const S3_BUCKET_REQUIRED: &str = "must specify a value for S3_BUCKET_NAME for S3 support";

pub struct ImageSources<'a> {
    pub downloader: &'a dyn ImageDownloader,
    pub object_store: &'a dyn ImageObjectStore,
}

/// Handles an API Gateway proxy event end to end. Request-level failures are
/// returned as error responses, never as `Err`.
pub fn handle_optimize_event(
    event: &Value,
    config: &OptimizerConfig,
    sources: &ImageSources<'_>,
) -> ApiGatewayResponse {
    let started_at = Instant::now();

    let outcome = parse_event(event).and_then(|request| {
        log_optimizer_info(
            "request_received",
            json!({
                "url": request.url.clone(),
                "width": request.width,
                "quality": request.quality,
            }),
        );
        download_and_optimize(&request, config, sources)
    });

    match outcome {
        Ok(image) => {
            log_optimizer_info(
                "request_completed",
                json!({
                    "content_type": image.content_type,
                    "width": image.width,
                    "height": image.height,
                    "optimized_bytes": image.data.len(),
                    "ratio": image.ratio,
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            image_response(&image)
        }
        Err(error) => {
            log_optimizer_error(
                "request_failed",
                json!({
                    "status_code": error.status_code(),
                    "error": error.to_string(),
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            ApiGatewayResponse::from(&error)
        }
    }
}

/// Fetches the original and re-encodes it; knows nothing about Lambda events.
pub fn download_and_optimize(
    request: &OptimizeRequest,
    config: &OptimizerConfig,
    sources: &ImageSources<'_>,
) -> Result<OptimizedImage, HandlerError> {
    let original = fetch_original(&request.url, config, sources)?;

    log_optimizer_info(
        "image_fetched",
        json!({
            "declared_content_type": original.content_type.clone(),
            "declared_content_size": original.content_size,
            "original_bytes": original.original_size(),
        }),
    );

    optimize_image(&original.bytes, request.width, request.quality)
}

fn fetch_original(
    url: &str,
    config: &OptimizerConfig,
    sources: &ImageSources<'_>,
) -> Result<FetchedImage, HandlerError> {
    match ImageSource::classify(url) {
        ImageSource::Remote(remote) => sources
            .downloader
            .download(&remote, config.download_chunk_size)
            .map_err(HandlerError::Fetch),
        ImageSource::S3Key(key) => {
            let bucket = config
                .s3_bucket_name
                .as_deref()
                .ok_or_else(|| HandlerError::Misconfiguration(S3_BUCKET_REQUIRED.to_string()))?;
            sources
                .object_store
                .get_object(bucket, &key, config.download_chunk_size)
                .map_err(HandlerError::Fetch)
        }
    }
}

fn log_optimizer_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "optimizer_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_optimizer_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "optimizer_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
