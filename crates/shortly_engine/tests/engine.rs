use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use shortly_engine::{
    ApiError, ApiSettings, AuthError, EngineEvent, EngineHandle, Endpoints, Identity,
    ReqwestShortenerApi, ShortenRequest, ShortenerApi, StaticIdentityProvider, UrlRecord,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identity() -> Identity {
    Identity {
        email: "ada@example.com".to_string(),
        display_name: "Ada".to_string(),
        photo_url: "https://img.example.com/ada.png".to_string(),
    }
}

fn engine_for(server: &MockServer, identity: Option<Identity>) -> EngineHandle {
    let api = ReqwestShortenerApi::new(
        Endpoints {
            shorten_url: format!("{}/shorten", server.uri()),
            history_url: format!("{}/urls/", server.uri()),
        },
        ApiSettings::default(),
    )
    .expect("client");
    EngineHandle::new(
        Arc::new(api),
        Arc::new(StaticIdentityProvider::new(identity)),
    )
    .expect("engine")
}

/// Polls without blocking the test runtime.
async fn next_event(engine: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        assert!(Instant::now() < deadline, "no engine event within 5s");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn shorten_completion_carries_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/shorten"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_short_url": "/abc123"
        })))
        .mount(&server)
        .await;

    let engine = engine_for(&server, None);
    engine.shorten(
        42,
        ShortenRequest {
            source_url: "https://example.com".to_string(),
            email: "null".to_string(),
            captcha_token: "tok".to_string(),
        },
    );

    assert_eq!(
        next_event(&engine).await,
        EngineEvent::ShortenCompleted {
            request_id: 42,
            result: Ok("/abc123".to_string()),
        }
    );
}

#[tokio::test]
async fn history_completion_carries_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/urls/YWRhQGV4YW1wbGUuY29t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_urls": [{ "original_url": "https://example.com", "short_url": "/e" }]
        })))
        .mount(&server)
        .await;

    let engine = engine_for(&server, None);
    engine.fetch_history(7, "ada@example.com");

    assert_eq!(
        next_event(&engine).await,
        EngineEvent::HistoryFetched {
            request_id: 7,
            result: Ok(vec![UrlRecord {
                original_url: "https://example.com".to_string(),
                short_url: "/e".to_string(),
            }]),
        }
    );
}

#[tokio::test]
async fn sign_in_uses_configured_identity() {
    let server = MockServer::start().await;
    let engine = engine_for(&server, Some(identity()));

    engine.sign_in(3);
    assert_eq!(
        next_event(&engine).await,
        EngineEvent::SignInCompleted {
            request_id: 3,
            result: Ok(identity()),
        }
    );

    engine.sign_out();
    assert_eq!(next_event(&engine).await, EngineEvent::SignOutCompleted(Ok(())));
}

#[tokio::test]
async fn sign_in_without_identity_fails() {
    let server = MockServer::start().await;
    let engine = engine_for(&server, None);

    engine.sign_in(9);
    assert_eq!(
        next_event(&engine).await,
        EngineEvent::SignInCompleted {
            request_id: 9,
            result: Err(AuthError::NotConfigured),
        }
    );
}

#[tokio::test]
async fn overlapping_sign_ins_keep_their_ids() {
    let server = MockServer::start().await;
    let engine = engine_for(&server, Some(identity()));

    engine.sign_in(1);
    engine.sign_in(2);
    let mut ids = Vec::new();
    for _ in 0..2 {
        match next_event(&engine).await {
            EngineEvent::SignInCompleted { request_id, result } => {
                assert_eq!(result, Ok(identity()));
                ids.push(request_id);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

struct NeverApi;

#[async_trait::async_trait]
impl ShortenerApi for NeverApi {
    async fn shorten(&self, _request: &ShortenRequest) -> Result<String, ApiError> {
        std::future::pending().await
    }

    async fn fetch_history(&self, _email: &str) -> Result<Vec<UrlRecord>, ApiError> {
        std::future::pending().await
    }
}

#[test]
fn drop_stops_engine_with_calls_in_flight() {
    let engine = EngineHandle::new(
        Arc::new(NeverApi),
        Arc::new(StaticIdentityProvider::default()),
    )
    .expect("engine");
    engine.fetch_history(1, "ada@example.com");
    assert!(engine.recv_timeout(Duration::from_millis(50)).is_none());

    let started = Instant::now();
    drop(engine);
    assert!(started.elapsed() < Duration::from_secs(2));
}
