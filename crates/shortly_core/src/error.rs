use std::fmt;

use thiserror::Error;

/// Everything that can occupy the single visible error slot.
///
/// `Display` yields the exact user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// HTTP 422 from the shorten endpoint.
    #[error("Invalid URL: {reason}")]
    SemanticRejection { reason: String },
    #[error("An unexpected error occurred. Please try again.")]
    Transient,
    #[error("{0} failed. Please try again.")]
    Auth(AuthAction),
    #[error("Failed to fetch user URLs. Please try again later.")]
    HistoryUnavailable,
}

/// Local precondition failures; these never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid URL.")]
    EmptyUrl,
    #[error("Please complete the CAPTCHA.")]
    MissingToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Logout,
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthAction::Login => write!(f, "Login"),
            AuthAction::Logout => write!(f, "Logout"),
        }
    }
}
