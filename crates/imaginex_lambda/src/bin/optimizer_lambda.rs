use imaginex_core::config::OptimizerConfig;
use imaginex_core::response::ApiGatewayResponse;
use imaginex_lambda::adapters::http::HttpImageDownloader;
use imaginex_lambda::adapters::s3::S3ImageStore;
use imaginex_lambda::handlers::optimize::{handle_optimize_event, ImageSources};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

#[derive(Clone)]
struct RuntimeDependencies {
    config: OptimizerConfig,
    downloader: HttpImageDownloader,
    object_store: S3ImageStore,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    let sources = ImageSources {
        downloader: &deps.downloader,
        object_store: &deps.object_store,
    };
    Ok(handle_optimize_event(&event.payload, &deps.config, &sources))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = OptimizerConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        config,
        downloader: HttpImageDownloader::default(),
        object_store: S3ImageStore::new(aws_sdk_s3::Client::new(&aws_config)),
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
