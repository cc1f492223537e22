use crate::{HistoryEntry, Principal, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// Verification widget completed a challenge.
    TokenAcquired(String),
    /// Verification widget reported the unused token as expired.
    TokenExpired,
    /// User clicked the shorten trigger.
    SubmitClicked,
    /// Shorten call finished.
    ShortenCompleted {
        request_id: RequestId,
        outcome: ShortenOutcome,
    },
    /// User asked to sign in.
    LoginClicked,
    /// Identity-provider handshake finished. The error carries provider detail
    /// for logging only.
    LoginCompleted {
        request_id: RequestId,
        outcome: Result<Principal, String>,
    },
    /// User asked to sign out.
    LogoutClicked,
    /// Remote sign-out finished.
    LogoutCompleted(Result<(), String>),
    /// User asked to reload the history list.
    HistoryRequested,
    /// History read finished.
    HistoryLoaded {
        request_id: RequestId,
        outcome: Result<Vec<HistoryEntry>, String>,
    },
}

/// Classified response of the shorten endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenOutcome {
    /// 200 with the short-url fragment.
    Shortened { short_path: String },
    /// 422 with the server-provided reason.
    Rejected { reason: String },
    /// Anything else: transport error, timeout, other status.
    Failed { detail: String },
}
