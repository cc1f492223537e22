use std::time::Duration;

use base64::Engine as _;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shortly_logging::{redacted, shortly_debug, shortly_warn};

use crate::types::{HistoryResponse, RejectionBody, ShortenResponse};
use crate::{ApiError, FailureKind, ShortenRequest, UrlRecord};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 1024 * 1024,
        }
    }
}

/// Remote endpoints, used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub shorten_url: String,
    /// The encoded email is appended without a separator.
    pub history_url: String,
}

#[async_trait::async_trait]
pub trait ShortenerApi: Send + Sync {
    /// Returns the short-url fragment on success.
    async fn shorten(&self, request: &ShortenRequest) -> Result<String, ApiError>;

    async fn fetch_history(&self, email: &str) -> Result<Vec<UrlRecord>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestShortenerApi {
    endpoints: Endpoints,
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestShortenerApi {
    pub fn new(endpoints: Endpoints, settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            endpoints,
            settings,
            client,
        })
    }

    /// Reads the whole body, failing once it grows past `max_bytes`.
    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, ApiError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

#[async_trait::async_trait]
impl ShortenerApi for ReqwestShortenerApi {
    async fn shorten(&self, request: &ShortenRequest) -> Result<String, ApiError> {
        let payload = serde_json::to_vec(request)
            .map_err(|err| ApiError::new(FailureKind::Payload, err.to_string()))?;
        shortly_debug!(
            "POST {} source_len={} token={}",
            self.endpoints.shorten_url,
            request.source_url.len(),
            redacted(&request.captcha_token)
        );

        let response = self
            .client
            .post(&self.endpoints.shorten_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = self.read_body(response).await?;
            let reason = rejection_reason(&body);
            shortly_warn!("Shorten rejected: {}", reason);
            return Err(ApiError::new(
                FailureKind::Rejected { reason },
                status.to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        let parsed: ShortenResponse = decode(&body)?;
        Ok(parsed.result_short_url)
    }

    async fn fetch_history(&self, email: &str) -> Result<Vec<UrlRecord>, ApiError> {
        let url = format!("{}{}", self.endpoints.history_url, history_key(email));
        shortly_debug!("GET {}", self.endpoints.history_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        let parsed: HistoryResponse = decode(&body)?;
        Ok(parsed.user_urls)
    }
}

/// Opaque history key for an email: standard base64 of its bytes.
pub fn history_key(email: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(email)
}

fn rejection_reason(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<RejectionBody>(body) {
        return parsed.error;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "unprocessable entity".to_string()
    } else {
        text
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::new(FailureKind::Payload, err.to_string()))
}

fn too_large(max_bytes: u64, actual: u64) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_key_matches_browser_btoa() {
        assert_eq!(history_key("ada@example.com"), "YWRhQGV4YW1wbGUuY29t");
        assert_eq!(history_key(""), "");
    }

    #[test]
    fn rejection_reason_prefers_json_error_field() {
        assert_eq!(
            rejection_reason(br#"{"error":"scheme not allowed"}"#),
            "scheme not allowed"
        );
        assert_eq!(rejection_reason(b"  plain text  "), "plain text");
        assert_eq!(rejection_reason(b""), "unprocessable entity");
    }
}
