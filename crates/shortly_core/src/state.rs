use crate::view_model::{AppViewModel, HistoryRowView};
use crate::{ClientConfig, ClientError};

/// Identifies one outbound call requested through an [`crate::Effect`].
///
/// Ids are never reused within an `AppState`, so a completion for an
/// abandoned call can never match the call that replaced it.
pub type RequestId = u64;

/// Requester email sent on the wire for anonymous submissions.
pub const ANONYMOUS_EMAIL: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    identity: Option<Principal>,
}

impl Session {
    pub fn identity(&self) -> Option<&Principal> {
        self.identity.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.as_ref().map(|principal| principal.email.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}

/// One-time proof from the verification widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    value: String,
    consumed: bool,
}

impl VerificationToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            consumed: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Payload of one shorten call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub source_url: String,
    pub requester_email: Option<String>,
    pub token: String,
}

impl SubmissionRequest {
    /// Email as sent to the backend, with the anonymous marker filled in.
    pub fn wire_email(&self) -> &str {
        self.requester_email.as_deref().unwrap_or(ANONYMOUS_EMAIL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Transient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success { short_url: String },
    Failure { kind: ErrorKind, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub original_url: String,
    pub short_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    config: ClientConfig,
    session: Session,
    pending_login: Option<RequestId>,
    input: String,
    token: Option<VerificationToken>,
    pending_shorten: Option<RequestId>,
    pending_history: Option<RequestId>,
    next_request_id: RequestId,
    result: Option<SubmissionResult>,
    error: Option<ClientError>,
    history: Vec<HistoryEntry>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl AppState {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: Session::default(),
            pending_login: None,
            input: String::new(),
            token: None,
            pending_shorten: None,
            pending_history: None,
            next_request_id: 1,
            result: None,
            error: None,
            history: Vec::new(),
            dirty: false,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn token(&self) -> Option<&VerificationToken> {
        self.token.as_ref()
    }

    /// True while a shorten call is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_shorten.is_some()
    }

    pub fn is_login_pending(&self) -> bool {
        self.pending_login.is_some()
    }

    /// True while a history read is in flight.
    pub fn is_history_loading(&self) -> bool {
        self.pending_history.is_some()
    }

    /// True while any remote call the state still waits for is in flight.
    pub fn has_calls_in_flight(&self) -> bool {
        self.is_loading() || self.is_login_pending() || self.is_history_loading()
    }

    pub fn last_result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn view(&self) -> AppViewModel {
        let has_token = self
            .token
            .as_ref()
            .is_some_and(|token| !token.is_consumed());
        AppViewModel {
            principal: self.session.identity().cloned(),
            login_pending: self.is_login_pending(),
            input: self.input.clone(),
            loading: self.is_loading(),
            has_token,
            can_submit: has_token && !self.is_loading(),
            error_message: self.error.as_ref().map(ToString::to_string),
            result_short_url: match &self.result {
                Some(SubmissionResult::Success { short_url }) => Some(short_url.clone()),
                _ => None,
            },
            history: self
                .history
                .iter()
                .map(|entry| HistoryRowView {
                    original_url: entry.original_url.clone(),
                    short_url: self.config.short_url(&entry.short_url),
                })
                .collect(),
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_token(&mut self, token: Option<VerificationToken>) {
        if self.token != token {
            self.token = token;
            self.mark_dirty();
        }
    }

    /// Marks the stored token consumed and hands out its value, if it is fresh.
    pub(crate) fn consume_token(&mut self) -> Option<String> {
        let token = self.token.as_mut().filter(|token| !token.consumed)?;
        token.consumed = true;
        self.dirty = true;
        Some(token.value.clone())
    }

    pub(crate) fn set_error(&mut self, error: Option<ClientError>) {
        self.error = error;
        self.mark_dirty();
    }

    pub(crate) fn set_result(&mut self, result: Option<SubmissionResult>) {
        self.result = result;
        self.mark_dirty();
    }

    pub(crate) fn pending_shorten(&self) -> Option<RequestId> {
        self.pending_shorten
    }

    pub(crate) fn set_pending_shorten(&mut self, request_id: Option<RequestId>) {
        self.pending_shorten = request_id;
        self.mark_dirty();
    }

    pub(crate) fn pending_history(&self) -> Option<RequestId> {
        self.pending_history
    }

    pub(crate) fn set_pending_history(&mut self, request_id: Option<RequestId>) {
        self.pending_history = request_id;
    }

    pub(crate) fn replace_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = entries;
        self.mark_dirty();
    }

    pub(crate) fn pending_login(&self) -> Option<RequestId> {
        self.pending_login
    }

    pub(crate) fn set_pending_login(&mut self, request_id: Option<RequestId>) {
        self.pending_login = request_id;
        self.mark_dirty();
    }

    pub(crate) fn set_identity(&mut self, identity: Option<Principal>) {
        self.session.identity = identity;
        self.mark_dirty();
    }

    /// Back to the initial state, keeping only the config and the request-id
    /// counter.
    pub(crate) fn reset(&mut self) {
        let next_request_id = self.next_request_id;
        *self = Self::new(self.config.clone());
        self.next_request_id = next_request_id;
        self.dirty = true;
    }
}
