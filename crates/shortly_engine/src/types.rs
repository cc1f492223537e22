use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthError;

pub type RequestId = u64;

/// Body of `POST {shorten_url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortenRequest {
    pub source_url: String,
    pub email: String,
    pub captcha_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShortenResponse {
    pub result_short_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectionBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    pub user_urls: Vec<UrlRecord>,
}

/// One row of a user's history as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub original_url: String,
    pub short_url: String,
}

/// Identity returned by the provider handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ShortenCompleted {
        request_id: RequestId,
        result: Result<String, ApiError>,
    },
    HistoryFetched {
        request_id: RequestId,
        result: Result<Vec<UrlRecord>, ApiError>,
    },
    SignInCompleted {
        request_id: RequestId,
        result: Result<Identity, AuthError>,
    },
    SignOutCompleted(Result<(), AuthError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// 422: the backend judged the input invalid.
    Rejected { reason: String },
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Body could not be encoded or decoded.
    Payload,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Rejected { reason } => write!(f, "rejected ({reason})"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Payload => write!(f, "malformed payload"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
