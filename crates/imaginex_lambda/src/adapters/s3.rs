use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use imaginex_core::source::FetchedImage;
use tokio::io::AsyncReadExt;

use crate::adapters::object_store::ImageObjectStore;

#[derive(Debug, Clone)]
pub struct S3ImageStore {
    s3_client: aws_sdk_s3::Client,
}

impl S3ImageStore {
    pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
        Self { s3_client }
    }
}

impl ImageObjectStore for S3ImageStore {
    fn get_object(&self, bucket: &str, key: &str, chunk_size: usize) -> Result<FetchedImage, String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| describe_get_object_error(&error))?;

                let content_type = output.content_type().map(str::to_string);
                let content_size = output
                    .content_length()
                    .and_then(|length| u64::try_from(length).ok());

                let mut reader = output.body.into_async_read();
                let mut buffer = vec![0u8; chunk_size.max(1)];
                let mut bytes = Vec::new();
                loop {
                    let read = reader
                        .read(&mut buffer)
                        .await
                        .map_err(|error| format!("failed to read s3 object body: {error}"))?;
                    if read == 0 {
                        break;
                    }
                    bytes.extend_from_slice(&buffer[..read]);
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

/// Keeps the S3 error code and message, which `SdkError`'s own `Display` drops.
fn describe_get_object_error<R>(error: &SdkError<GetObjectError, R>) -> String
where
    R: std::fmt::Debug,
{
    format!("failed to read object from s3: {}", DisplayErrorContext(error))
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_smithy_runtime_api::http::{Response, StatusCode};
    use aws_smithy_types::body::SdkBody;

    use super::*;

    #[test]
    fn get_object_errors_keep_service_code_and_message() {
        let metadata = ErrorMetadata::builder()
            .code("InvalidBucketName")
            .message("The specified bucket is not valid.")
            .build();
        let status = StatusCode::try_from(400u16).expect("valid status code");
        let error = SdkError::service_error(
            GetObjectError::generic(metadata),
            Response::new(status, SdkBody::empty()),
        );

        let message = describe_get_object_error(&error);

        assert!(message.starts_with("failed to read object from s3: "));
        assert!(message.contains("InvalidBucketName"), "{message}");
        assert!(message.contains("The specified bucket is not valid."), "{message}");
    }
}
