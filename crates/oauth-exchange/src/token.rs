//! Authorization code exchange
//!
//! POSTs the code together with the provider's client credentials to the
//! provider token endpoint and extracts the access token. A failed exchange
//! is reported once; there is no retry.

use std::fmt;

use common::Secret;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::provider::ProviderStrategy;
use crate::request::ExchangeRequest;
use crate::transport::{OutboundRequest, Transport};

/// Access token issued by the provider. Lives only as long as the session
/// that obtained it and is redacted in `Debug`.
#[derive(Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Secret::new(value.into()))
    }

    pub fn value(&self) -> &str {
        self.0.expose()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_blank()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.0).finish()
    }
}

/// Build the token request body: `code`, `redirect_uri`, `client_id`,
/// `client_secret`, `grant_type`.
pub fn token_request(
    strategy: &dyn ProviderStrategy,
    request: &ExchangeRequest,
) -> OutboundRequest {
    let credentials = strategy.credentials();
    OutboundRequest::post_form(
        strategy.token_endpoint(),
        vec![
            ("code".into(), request.authorization_code().into()),
            ("redirect_uri".into(), request.redirect_uri().into()),
            ("client_id".into(), credentials.client_id().into()),
            ("client_secret".into(), credentials.client_secret().into()),
            ("grant_type".into(), credentials.grant_type().into()),
        ],
    )
}

/// Exchange an authorization code for an access token.
///
/// Transport failures surface as `Transport`. A non-2xx status, or a 2xx body
/// without a non-blank `access_token`, is `TokenExchangeFailed` carrying the
/// raw body.
pub async fn exchange(
    transport: &dyn Transport,
    strategy: &dyn ProviderStrategy,
    request: &ExchangeRequest,
) -> Result<AccessToken> {
    let response = transport.send(token_request(strategy, request)).await?;

    if !response.is_success() {
        warn!(
            provider = strategy.name(),
            status = response.status,
            "token endpoint rejected the authorization code"
        );
        return Err(Error::TokenExchangeFailed {
            status: response.status,
            body: response.body,
        });
    }

    match strategy.parse_access_token(&response.body) {
        Some(token) if !token.is_empty() => {
            debug!(provider = strategy.name(), "access token issued");
            Ok(token)
        }
        _ => {
            warn!(
                provider = strategy.name(),
                status = response.status,
                "token response carried no access_token"
            );
            Err(Error::TokenExchangeFailed {
                status: response.status,
                body: response.body,
            })
        }
    }
}
