//! Runs the optimizer handler once against a saved API Gateway event.
//!
//! Usage: `local_invoke <event.json> [output-file]`. The decoded image is
//! written to `output-file` when given; the response metadata goes to stdout.

use std::fs;
use std::process::exit;

use imaginex_core::config::OptimizerConfig;
use imaginex_lambda::adapters::http::HttpImageDownloader;
use imaginex_lambda::adapters::s3::S3ImageStore;
use imaginex_lambda::handlers::optimize::{handle_optimize_event, ImageSources};
use serde_json::{json, Value};

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let Some(event_path) = args.next() else {
        eprintln!("usage: local_invoke <event.json> [output-file]");
        exit(2);
    };
    let output_path = args.next();

    if let Err(message) = run(&event_path, output_path.as_deref()).await {
        eprintln!("local invoke failed: {message}");
        exit(1);
    }
}

async fn run(event_path: &str, output_path: Option<&str>) -> Result<(), String> {
    let raw = fs::read_to_string(event_path)
        .map_err(|error| format!("failed to read event file '{event_path}': {error}"))?;
    let event: Value = serde_json::from_str(&raw)
        .map_err(|error| format!("invalid event json in '{event_path}': {error}"))?;

    let config = OptimizerConfig::from_env().map_err(|error| error.to_string())?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let downloader = HttpImageDownloader::default();
    let object_store = S3ImageStore::new(aws_sdk_s3::Client::new(&aws_config));
    let sources = ImageSources {
        downloader: &downloader,
        object_store: &object_store,
    };

    let response = handle_optimize_event(&event, &config, &sources);

    if let (Some(path), true) = (output_path, response.is_base64_encoded) {
        use base64::Engine as _;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&response.body)
            .map_err(|error| format!("response body is not base64: {error}"))?;
        fs::write(path, data).map_err(|error| format!("failed to write '{path}': {error}"))?;
    }

    let summary = json!({
        "statusCode": response.status_code,
        "headers": response.headers,
        "bodyBytes": response.body.len(),
    });
    println!("{summary}");
    Ok(())
}
