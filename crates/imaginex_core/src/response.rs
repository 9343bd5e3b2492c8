use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::HandlerError;
use crate::optimize::OptimizedImage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
    #[serde(
        rename = "isBase64Encoded",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_base64_encoded: bool,
}

impl ApiGatewayResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(Value::as_str)
    }
}

pub fn image_response(image: &OptimizedImage) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 200,
        headers: json!({
            "Vary": "Accept",
            "Content-Type": image.content_type,
            "X-Optimization-Ratio": format!("{:.4}", image.ratio),
        }),
        body: STANDARD.encode(&image.data),
        is_base64_encoded: true,
    }
}

pub fn error_response(status_code: u16, message: &str) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({
            "Vary": "Accept",
            "Content-Type": "application/json",
        }),
        body: json!({ "error": message }).to_string(),
        is_base64_encoded: false,
    }
}

impl From<&HandlerError> for ApiGatewayResponse {
    fn from(error: &HandlerError) -> Self {
        error_response(error.status_code(), &error.to_string())
    }
}
