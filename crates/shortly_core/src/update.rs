use crate::{
    AppState, AuthAction, ClientError, Effect, ErrorKind, HistoryEntry, Msg, Principal,
    RequestId, ShortenOutcome, SubmissionRequest, SubmissionResult, ValidationError,
    VerificationToken,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::TokenAcquired(value) => {
            let token = Some(value)
                .filter(|value| !value.trim().is_empty())
                .map(VerificationToken::new);
            state.set_token(token);
            Vec::new()
        }
        Msg::TokenExpired => {
            state.set_token(None);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::ShortenCompleted {
            request_id,
            outcome,
        } => finish_submission(&mut state, request_id, outcome),
        Msg::LoginClicked => begin_login(&mut state),
        Msg::LoginCompleted {
            request_id,
            outcome,
        } => finish_login(&mut state, request_id, outcome),
        Msg::LogoutClicked => logout(&mut state),
        Msg::LogoutCompleted(result) => {
            // Local state was already reset when the logout started.
            if result.is_err() {
                state.set_error(Some(ClientError::Auth(AuthAction::Logout)));
            }
            Vec::new()
        }
        Msg::HistoryRequested => load_history(&mut state),
        Msg::HistoryLoaded {
            request_id,
            outcome,
        } => apply_history(&mut state, request_id, outcome),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    // The trigger is disabled while loading; a second click is dropped.
    if state.is_loading() {
        return Vec::new();
    }

    let source_url = state.input().trim().to_owned();
    if source_url.is_empty() {
        reject(state, ValidationError::EmptyUrl);
        return Vec::new();
    }
    let Some(token) = state.consume_token() else {
        reject(state, ValidationError::MissingToken);
        return Vec::new();
    };

    state.set_error(None);
    state.set_result(None);
    let request_id = state.allocate_request_id();
    state.set_pending_shorten(Some(request_id));

    let request = SubmissionRequest {
        source_url,
        requester_email: state.session().email().map(ToOwned::to_owned),
        token,
    };
    vec![Effect::Shorten {
        request_id,
        request,
    }]
}

fn reject(state: &mut AppState, error: ValidationError) {
    state.set_result(None);
    state.set_error(Some(error.into()));
}

fn finish_submission(
    state: &mut AppState,
    request_id: RequestId,
    outcome: ShortenOutcome,
) -> Vec<Effect> {
    if state.pending_shorten() != Some(request_id) {
        return Vec::new();
    }
    state.set_pending_shorten(None);

    match outcome {
        ShortenOutcome::Shortened { short_path } => {
            let short_url = state.config().short_url(&short_path);
            state.set_error(None);
            state.set_result(Some(SubmissionResult::Success { short_url }));
        }
        ShortenOutcome::Rejected { reason } => {
            state.set_error(Some(ClientError::SemanticRejection {
                reason: reason.clone(),
            }));
            state.set_result(Some(SubmissionResult::Failure {
                kind: ErrorKind::InvalidInput,
                detail: reason,
            }));
        }
        ShortenOutcome::Failed { detail } => {
            state.set_error(Some(ClientError::Transient));
            state.set_result(Some(SubmissionResult::Failure {
                kind: ErrorKind::Transient,
                detail,
            }));
        }
    }

    // The token went out with the request; the widget must issue a new one.
    state.set_token(None);
    let mut effects = vec![Effect::ResetVerification];
    effects.extend(load_history(state));
    effects
}

fn begin_login(state: &mut AppState) -> Vec<Effect> {
    if state.is_login_pending() || state.session().is_signed_in() {
        return Vec::new();
    }
    state.set_error(None);
    let request_id = state.allocate_request_id();
    state.set_pending_login(Some(request_id));
    vec![Effect::SignIn { request_id }]
}

fn finish_login(
    state: &mut AppState,
    request_id: RequestId,
    result: Result<Principal, String>,
) -> Vec<Effect> {
    // A handshake started before a logout must not sign in the next session.
    if state.pending_login() != Some(request_id) {
        return Vec::new();
    }
    state.set_pending_login(None);

    match result {
        Ok(principal) => {
            let mut effects = abandon_in_flight(state);
            state.set_identity(Some(principal));
            effects.extend(load_history(state));
            effects
        }
        Err(_) => {
            state.set_error(Some(ClientError::Auth(AuthAction::Login)));
            Vec::new()
        }
    }
}

/// Drops calls dispatched under the previous identity so their completions
/// are ignored.
fn abandon_in_flight(state: &mut AppState) -> Vec<Effect> {
    state.set_pending_history(None);
    if state.is_loading() {
        state.set_pending_shorten(None);
        state.set_token(None);
        vec![Effect::ResetVerification]
    } else {
        Vec::new()
    }
}

fn logout(state: &mut AppState) -> Vec<Effect> {
    let had_session = state.session().is_signed_in() || state.is_login_pending();
    state.reset();

    let mut effects = Vec::with_capacity(2);
    if had_session {
        effects.push(Effect::SignOut);
    }
    effects.push(Effect::ResetVerification);
    effects
}

fn load_history(state: &mut AppState) -> Vec<Effect> {
    let Some(email) = state.session().email().map(ToOwned::to_owned) else {
        return Vec::new();
    };
    let request_id = state.allocate_request_id();
    state.set_pending_history(Some(request_id));
    vec![Effect::FetchHistory { request_id, email }]
}

fn apply_history(
    state: &mut AppState,
    request_id: RequestId,
    outcome: Result<Vec<HistoryEntry>, String>,
) -> Vec<Effect> {
    if state.pending_history() != Some(request_id) {
        return Vec::new();
    }
    state.set_pending_history(None);

    match outcome {
        Ok(entries) => state.replace_history(entries),
        Err(_) => state.set_error(Some(ClientError::HistoryUnavailable)),
    }
    Vec::new()
}
