use crate::Principal;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub principal: Option<Principal>,
    pub login_pending: bool,
    pub input: String,
    pub loading: bool,
    /// A fresh verification token is held.
    pub has_token: bool,
    /// The shorten trigger is enabled.
    pub can_submit: bool,
    pub error_message: Option<String>,
    pub result_short_url: Option<String>,
    pub history: Vec<HistoryRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub original_url: String,
    /// Short URL joined with the backend base.
    pub short_url: String,
}
