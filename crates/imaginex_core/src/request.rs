use serde_json::{Map, Value};

use crate::error::HandlerError;

pub const DEFAULT_QUALITY: u8 = 70;
const MIN_QUALITY: i64 = 1;
const MAX_QUALITY: i64 = 100;

/// A validated optimize request taken from the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeRequest {
    pub url: String,
    pub width: u32,
    pub quality: u8,
}

/// Reads `queryStringParameters` from an API Gateway proxy event.
pub fn parse_event(event: &Value) -> Result<OptimizeRequest, HandlerError> {
    let params = event
        .get("queryStringParameters")
        .and_then(Value::as_object);
    parse_query(params)
}

pub fn parse_query(params: Option<&Map<String, Value>>) -> Result<OptimizeRequest, HandlerError> {
    let param = |name: &str| params.and_then(|map| map.get(name)).filter(|v| !v.is_null());

    let width = match param("w") {
        Some(value) => integer_param("w", value)?,
        None => 0,
    };
    let quality = match param("q") {
        Some(value) => integer_param("q", value)?,
        None => i64::from(DEFAULT_QUALITY),
    };

    let url = param("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if url.is_empty() {
        return Err(HandlerError::validation("url is required"));
    }
    if width <= 0 {
        return Err(HandlerError::validation("width must be greater than zero"));
    }
    let width = u32::try_from(width).map_err(|_| HandlerError::validation("w is out of range"))?;

    Ok(OptimizeRequest {
        url: url.to_string(),
        width,
        quality: clamp_quality(quality),
    })
}

fn integer_param(name: &str, value: &Value) -> Result<i64, HandlerError> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| HandlerError::validation(format!("{name} must be an integer")))
}

fn clamp_quality(quality: i64) -> u8 {
    quality.clamp(MIN_QUALITY, MAX_QUALITY) as u8
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(event: Value) -> Result<OptimizeRequest, HandlerError> {
        parse_event(&event)
    }

    #[test]
    fn parses_url_width_and_default_quality() {
        let request = parse(json!({
            "queryStringParameters": {"url": "https://example.com/a.png", "w": "640"}
        }))
        .expect("request should parse");

        assert_eq!(
            request,
            OptimizeRequest {
                url: "https://example.com/a.png".to_string(),
                width: 640,
                quality: 70,
            }
        );
    }

    #[test]
    fn accepts_explicit_quality() {
        let request = parse(json!({
            "queryStringParameters": {"url": "images/a.jpg", "w": "100", "q": "35"}
        }))
        .expect("request should parse");
        assert_eq!(request.quality, 35);
    }

    #[test]
    fn clamps_out_of_range_quality() {
        let high = parse(json!({"queryStringParameters": {"url": "a", "w": 1, "q": 250}}))
            .expect("request should parse");
        let low = parse(json!({"queryStringParameters": {"url": "a", "w": 1, "q": "-3"}}))
            .expect("request should parse");
        assert_eq!(high.quality, 100);
        assert_eq!(low.quality, 1);
    }

    #[test]
    fn requires_url() {
        let error = parse(json!({"queryStringParameters": {"w": "10"}}))
            .expect_err("missing url should fail");
        assert_eq!(error, HandlerError::validation("url is required"));
        assert_eq!(error.status_code(), 422);
    }

    #[test]
    fn missing_query_string_is_treated_as_empty() {
        let error = parse(json!({"queryStringParameters": null})).expect_err("should fail");
        assert_eq!(error.to_string(), "url is required");
        let error = parse(json!({})).expect_err("should fail");
        assert_eq!(error.to_string(), "url is required");
    }

    #[test]
    fn requires_positive_width() {
        for width in [json!("0"), json!(-20)] {
            let error = parse(json!({"queryStringParameters": {"url": "a.png", "w": width}}))
                .expect_err("non-positive width should fail");
            assert_eq!(error.to_string(), "width must be greater than zero");
        }

        let error = parse(json!({"queryStringParameters": {"url": "a.png"}}))
            .expect_err("missing width should fail");
        assert_eq!(error.to_string(), "width must be greater than zero");
    }

    #[test]
    fn rejects_non_integer_parameters() {
        let error = parse(json!({"queryStringParameters": {"url": "a.png", "w": "wide"}}))
            .expect_err("non-integer width should fail");
        assert_eq!(error.to_string(), "w must be an integer");

        let error = parse(json!({"queryStringParameters": {"url": "a.png", "w": "5", "q": "1.5"}}))
            .expect_err("non-integer quality should fail");
        assert_eq!(error.to_string(), "q must be an integer");
    }
}
