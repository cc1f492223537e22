use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shortly_core::{Effect, HistoryEntry, Msg, Principal, ShortenOutcome, SubmissionRequest};
use shortly_engine::{
    ApiError, EngineEvent, EngineHandle, FailureKind, Identity, ReqwestShortenerApi,
    ShortenRequest, StaticIdentityProvider, UrlRecord,
};
use shortly_logging::{redacted, shortly_debug, shortly_info};

use super::cli::ConfigArgs;

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(args: &ConfigArgs) -> anyhow::Result<Self> {
        let api = ReqwestShortenerApi::new(args.endpoints(), args.api_settings())
            .context("failed to build HTTP client")?;
        let identity = StaticIdentityProvider::new(args.identity());
        let engine = EngineHandle::new(Arc::new(api), Arc::new(identity))
            .context("failed to start engine")?;
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Shorten {
                    request_id,
                    request,
                } => {
                    shortly_info!(
                        "Shorten #{} url_len={} signed_in={} token={}",
                        request_id,
                        request.source_url.len(),
                        request.requester_email.is_some(),
                        redacted(&request.token)
                    );
                    self.engine.shorten(request_id, to_wire(request));
                }
                Effect::FetchHistory { request_id, email } => {
                    shortly_info!("FetchHistory #{}", request_id);
                    self.engine.fetch_history(request_id, email);
                }
                Effect::SignIn { request_id } => {
                    shortly_info!("SignIn #{}", request_id);
                    self.engine.sign_in(request_id);
                }
                Effect::SignOut => {
                    shortly_info!("SignOut");
                    self.engine.sign_out();
                }
                Effect::ResetVerification => {
                    // The terminal has no widget; the view asks for a new token.
                    shortly_debug!("Verification reset");
                }
            }
        }
    }

    pub fn try_recv(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn to_wire(request: SubmissionRequest) -> ShortenRequest {
    ShortenRequest {
        email: request.wire_email().to_string(),
        source_url: request.source_url,
        captcha_token: request.token,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ShortenCompleted { request_id, result } => Msg::ShortenCompleted {
            request_id,
            outcome: map_shorten_result(result),
        },
        EngineEvent::HistoryFetched { request_id, result } => Msg::HistoryLoaded {
            request_id,
            outcome: result
                .map(|records| records.into_iter().map(map_record).collect())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::SignInCompleted { request_id, result } => Msg::LoginCompleted {
            request_id,
            outcome: result.map(map_identity).map_err(|err| err.to_string()),
        },
        EngineEvent::SignOutCompleted(result) => {
            Msg::LogoutCompleted(result.map_err(|err| err.to_string()))
        }
    }
}

fn map_shorten_result(result: Result<String, ApiError>) -> ShortenOutcome {
    match result {
        Ok(short_path) => ShortenOutcome::Shortened { short_path },
        Err(ApiError {
            kind: FailureKind::Rejected { reason },
            ..
        }) => ShortenOutcome::Rejected { reason },
        Err(err) => ShortenOutcome::Failed {
            detail: err.to_string(),
        },
    }
}

fn map_record(record: UrlRecord) -> HistoryEntry {
    HistoryEntry {
        original_url: record.original_url,
        short_url: record.short_url,
    }
}

fn map_identity(identity: Identity) -> Principal {
    Principal {
        email: identity.email,
        display_name: identity.display_name,
        avatar_url: identity.photo_url,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use shortly_engine::AuthError;

    use super::*;

    #[test]
    fn anonymous_request_uses_marker_email() {
        let wire = to_wire(SubmissionRequest {
            source_url: "https://example.com".to_string(),
            requester_email: None,
            token: "tok".to_string(),
        });
        assert_eq!(
            wire,
            ShortenRequest {
                source_url: "https://example.com".to_string(),
                email: "null".to_string(),
                captcha_token: "tok".to_string(),
            }
        );
    }

    #[test]
    fn rejection_keeps_server_reason() {
        let msg = map_event(EngineEvent::ShortenCompleted {
            request_id: 3,
            result: Err(ApiError {
                kind: FailureKind::Rejected {
                    reason: "scheme not allowed".to_string(),
                },
                message: "422 Unprocessable Entity".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::ShortenCompleted {
                request_id: 3,
                outcome: ShortenOutcome::Rejected {
                    reason: "scheme not allowed".to_string()
                },
            }
        );
    }

    #[test]
    fn other_failures_become_transient() {
        let msg = map_event(EngineEvent::ShortenCompleted {
            request_id: 4,
            result: Err(ApiError {
                kind: FailureKind::HttpStatus(502),
                message: "502 Bad Gateway".to_string(),
            }),
        });
        assert!(matches!(
            msg,
            Msg::ShortenCompleted {
                request_id: 4,
                outcome: ShortenOutcome::Failed { .. }
            }
        ));
    }

    #[test]
    fn identity_maps_to_principal() {
        let msg = map_event(EngineEvent::SignInCompleted {
            request_id: 5,
            result: Ok(Identity {
                email: "ada@example.com".to_string(),
                display_name: "Ada".to_string(),
                photo_url: "https://img.example.com/ada.png".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::LoginCompleted {
                request_id: 5,
                outcome: Ok(Principal {
                    email: "ada@example.com".to_string(),
                    display_name: "Ada".to_string(),
                    avatar_url: "https://img.example.com/ada.png".to_string(),
                }),
            }
        );

        let msg = map_event(EngineEvent::SignInCompleted {
            request_id: 6,
            result: Err(AuthError::NotConfigured),
        });
        assert_eq!(
            msg,
            Msg::LoginCompleted {
                request_id: 6,
                outcome: Err("no identity configured".to_string()),
            }
        );
    }
}
