//! Shortly core: pure state machine for submission, session and history.
mod config;
mod effect;
mod error;
mod msg;
mod route;
mod state;
mod update;
mod view_model;

pub use config::{join_url, ClientConfig, ConfigError};
pub use effect::Effect;
pub use error::{AuthAction, ClientError, ValidationError};
pub use msg::{Msg, ShortenOutcome};
pub use route::{resolve_route, Route};
pub use state::{
    AppState, ErrorKind, HistoryEntry, Principal, RequestId, Session, SubmissionRequest,
    SubmissionResult, VerificationToken, ANONYMOUS_EMAIL,
};
pub use update::update;
pub use view_model::{AppViewModel, HistoryRowView};
