//! Login attempt state machine
//!
//! Pure state machine: `handle_event` receives an event and returns
//! (new_state, action). `OAuthSession::run` executes the provider call each
//! action implies and feeds the result back in as the next event.
//!
//! ```text
//! Initialized -> Exchanging -> FetchingUserInfo -> Authorized
//!                    |               |
//!                    +---> Failed <--+
//! ```
//!
//! A session covers exactly one attempt. `Authorized` and `Failed` are
//! terminal; a new attempt needs a new session.

use std::sync::Arc;

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{Error, ErrorKind, Result};
use crate::provider::{ProviderRegistry, ProviderStrategy};
use crate::request::{ExchangeRequest, InboundParams};
use crate::token::{self, AccessToken};
use crate::transport::Transport;
use crate::userinfo::{self, UserInfo};

/// Session states.
#[derive(Debug)]
pub enum SessionState {
    /// Parameters validated, nothing sent yet
    Initialized,
    /// Token request in flight
    Exchanging,
    /// Token issued, profile request in flight
    FetchingUserInfo { token: AccessToken },
    /// Terminal success
    Authorized {
        token: AccessToken,
        user_info: UserInfo,
    },
    /// Terminal failure
    Failed { error: Error },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Initialized => "initialized",
            SessionState::Exchanging => "exchanging",
            SessionState::FetchingUserInfo { .. } => "fetching_user_info",
            SessionState::Authorized { .. } => "authorized",
            SessionState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Authorized { .. } | SessionState::Failed { .. }
        )
    }
}

/// Events that drive state transitions.
#[derive(Debug)]
pub enum SessionEvent {
    /// Caller asked the session to run
    Start,
    /// Token endpoint returned a usable token
    TokenIssued(AccessToken),
    /// Profile endpoint returned a parseable profile
    UserInfoFetched(UserInfo),
    /// The step in flight failed
    StepFailed(Error),
}

/// Provider call the caller should make after a transition.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionAction {
    ExchangeCode,
    FetchUserInfo,
    None,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(state: SessionState, event: SessionEvent) -> (SessionState, SessionAction) {
    match (state, event) {
        (SessionState::Initialized, SessionEvent::Start) => {
            (SessionState::Exchanging, SessionAction::ExchangeCode)
        }

        (SessionState::Exchanging, SessionEvent::TokenIssued(token)) => (
            SessionState::FetchingUserInfo { token },
            SessionAction::FetchUserInfo,
        ),

        (SessionState::FetchingUserInfo { token }, SessionEvent::UserInfoFetched(user_info)) => (
            SessionState::Authorized { token, user_info },
            SessionAction::None,
        ),

        (
            SessionState::Exchanging | SessionState::FetchingUserInfo { .. },
            SessionEvent::StepFailed(error),
        ) => (SessionState::Failed { error }, SessionAction::None),

        // --- Invalid/unhandled transition: stay in current state ---
        (state, _event) => (state, SessionAction::None),
    }
}

/// True only when both a token and a profile are present and non-empty.
fn authorized(token: Option<&AccessToken>, user_info: Option<&UserInfo>) -> bool {
    matches!(
        (token, user_info),
        (Some(token), Some(info)) if !token.is_empty() && !info.is_empty()
    )
}

/// One login attempt against one provider.
pub struct OAuthSession {
    attempt_id: Uuid,
    strategy: Arc<dyn ProviderStrategy>,
    request: ExchangeRequest,
    state: SessionState,
}

impl OAuthSession {
    /// Validate inbound parameters for `strategy`.
    ///
    /// Fails with `MissingAuthorizationCode` before any request is made when
    /// the code is absent or blank.
    pub fn new(strategy: Arc<dyn ProviderStrategy>, params: &InboundParams) -> Result<Self> {
        let request = ExchangeRequest::from_params(params)?;
        Ok(Self {
            attempt_id: Uuid::new_v4(),
            strategy,
            request,
            state: SessionState::Initialized,
        })
    }

    /// Select the provider by name, then validate parameters.
    pub fn for_provider(
        registry: &ProviderRegistry,
        provider: &str,
        params: &InboundParams,
    ) -> Result<Self> {
        let request = ExchangeRequest::from_params(params)?;
        let strategy = registry.select(provider)?;
        Ok(Self {
            attempt_id: Uuid::new_v4(),
            strategy,
            request,
            state: SessionState::Initialized,
        })
    }

    /// Drive the attempt to a terminal state.
    ///
    /// The token exchange and the profile fetch run strictly in sequence; the
    /// fetch never starts unless the exchange produced a token. Running a
    /// session that already left `Initialized` does nothing.
    pub async fn run(mut self, transport: &dyn Transport) -> Self {
        if !matches!(self.state, SessionState::Initialized) {
            debug!(attempt_id = %self.attempt_id, state = self.state.name(), "session already ran");
            return self;
        }
        let span = info_span!(
            "oauth_session",
            attempt_id = %self.attempt_id,
            provider = self.strategy.name(),
        );
        let state = std::mem::replace(&mut self.state, SessionState::Initialized);
        self.state = self.drive(state, transport).instrument(span).await;
        self
    }

    async fn drive(&self, state: SessionState, transport: &dyn Transport) -> SessionState {
        let (mut state, mut action) = handle_event(state, SessionEvent::Start);

        loop {
            let event = match action {
                SessionAction::ExchangeCode => {
                    match token::exchange(transport, self.strategy.as_ref(), &self.request).await {
                        Ok(token) => SessionEvent::TokenIssued(token),
                        Err(e) => SessionEvent::StepFailed(e),
                    }
                }
                SessionAction::FetchUserInfo => {
                    let SessionState::FetchingUserInfo { token } = &state else {
                        break;
                    };
                    match userinfo::fetch(transport, self.strategy.as_ref(), token).await {
                        Ok(info) => SessionEvent::UserInfoFetched(info),
                        Err(e) => SessionEvent::StepFailed(e),
                    }
                }
                SessionAction::None => break,
            };

            (state, action) = handle_event(state, event);
            debug!(state = state.name(), "session transition");
        }

        match &state {
            SessionState::Authorized { .. } => info!("login attempt authorized"),
            SessionState::Failed { error } => {
                warn!(kind = ?error.kind(), error = %error, "login attempt failed")
            }
            _ => {}
        }
        state
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn provider(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn request(&self) -> &ExchangeRequest {
        &self.request
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authorized(&self) -> bool {
        authorized(self.access_token(), self.user_info())
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        match &self.state {
            SessionState::FetchingUserInfo { token } | SessionState::Authorized { token, .. } => {
                Some(token)
            }
            _ => None,
        }
    }

    pub fn user_info(&self) -> Option<&UserInfo> {
        match &self.state {
            SessionState::Authorized { user_info, .. } => Some(user_info),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            SessionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Caller-facing result. The access token is not part of it.
    pub fn into_outcome(self) -> AuthOutcome {
        match self.state {
            SessionState::Authorized { token, user_info }
                if authorized(Some(&token), Some(&user_info)) =>
            {
                AuthOutcome {
                    authorized: true,
                    user_info: Some(user_info),
                    error: None,
                }
            }
            SessionState::Failed { error } => AuthOutcome::failed(&error),
            _ => AuthOutcome {
                authorized: false,
                user_info: None,
                error: None,
            },
        }
    }
}

/// Result handed back to the caller.
///
/// ```json
/// { "authorized": true, "userInfo": { "id": "u1", "email": "a@b.com" } }
/// { "authorized": false, "error": { "kind": "token_exchange_failed", "message": "..." } }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AuthOutcome {
    /// Outcome for an attempt that failed, including pre-flight failures that
    /// never produced a session.
    pub fn failed(error: &Error) -> Self {
        Self {
            authorized: false,
            user_info: None,
            error: Some(OutcomeError {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }
}
