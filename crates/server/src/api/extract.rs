//! Request body extraction.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::error::ApiError;

const INVALID_BODY: &str = "Ungültige Anfrage";

/// JSON request body that answers failures with the `{ "error": ... }` envelope.
///
/// A request without a JSON content type, or with an empty body, is read as
/// `{}` so every field falls back to its default.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn parse_body<T: DeserializeOwned>(is_json: bool, bytes: &[u8]) -> Result<T, ApiError> {
    let raw: &[u8] = if is_json && !bytes.iter().all(u8::is_ascii_whitespace) {
        bytes
    } else {
        b"{}"
    };
    serde_json::from_slice(raw).map_err(|e| {
        warn!("Rejected request body: {}", e);
        ApiError::bad_request(INVALID_BODY)
    })
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = is_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            warn!("Failed to read request body: {}", e);
            ApiError::bad_request(INVALID_BODY)
        })?;
        parse_body(is_json, &bytes).map(JsonBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Option<String>,
    }

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type(&headers("application/json")));
        assert!(is_json_content_type(&headers("application/json; charset=utf-8")));
        assert!(is_json_content_type(&headers("application/merge-patch+json")));
        assert!(!is_json_content_type(&headers("text/plain")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_non_json_body_reads_as_empty_object() {
        let body: Body = parse_body(false, br#"{"name":"Design"}"#).unwrap();
        assert!(body.name.is_none());

        let body: Body = parse_body(true, b"  ").unwrap();
        assert!(body.name.is_none());
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let err = parse_body::<Body>(true, b"{ not json").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = parse_body::<Body>(true, br#"{"name":5}"#).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
