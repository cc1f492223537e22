use crate::{RequestId, SubmissionRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the interactive identity-provider handshake.
    SignIn { request_id: RequestId },
    /// End the identity-provider session.
    SignOut,
    Shorten {
        request_id: RequestId,
        request: SubmissionRequest,
    },
    FetchHistory {
        request_id: RequestId,
        email: String,
    },
    /// Reset the verification widget so it issues a fresh token.
    ResetVerification,
}
