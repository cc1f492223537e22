//! Shortly engine: remote calls and effect execution.
mod api;
mod engine;
mod identity;
mod types;

pub use api::{history_key, ApiSettings, Endpoints, ReqwestShortenerApi, ShortenerApi};
pub use engine::{EngineError, EngineHandle};
pub use identity::{AuthError, IdentityProvider, StaticIdentityProvider};
pub use types::{
    ApiError, EngineEvent, FailureKind, Identity, RequestId, ShortenRequest, UrlRecord,
};
