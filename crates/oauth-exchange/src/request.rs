//! Inbound login parameters and the normalized exchange request
//!
//! The caller forwards whatever the browser client posted after the provider
//! redirect. Only the authorization code is mandatory; it is percent-decoded
//! once here so every later step sees the value the provider issued.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Raw parameters as posted by the client application.
///
/// ```json
/// { "oauthData": { "code": "4%2Fabc123" },
///   "authorizationData": { "redirect_uri": "https://app.example/cb" } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundParams {
    #[serde(default)]
    pub oauth_data: Option<OAuthData>,
    #[serde(default)]
    pub authorization_data: Option<AuthorizationData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthData {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationData {
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

impl InboundParams {
    pub fn new(code: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            oauth_data: Some(OAuthData {
                code: Some(code.into()),
            }),
            authorization_data: Some(AuthorizationData {
                redirect_uri: Some(redirect_uri.into()),
            }),
        }
    }
}

/// Validated, immutable input to the token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    authorization_code: String,
    redirect_uri: String,
}

impl ExchangeRequest {
    /// Normalize inbound parameters.
    ///
    /// Fails with `MissingAuthorizationCode` when the code is absent, blank,
    /// or decodes to blank. A missing redirect URI becomes an empty string and
    /// is left for the provider to judge.
    pub fn from_params(params: &InboundParams) -> Result<Self> {
        let raw = params
            .oauth_data
            .as_ref()
            .and_then(|data| data.code.as_deref())
            .filter(|code| !code.trim().is_empty())
            .ok_or(Error::MissingAuthorizationCode)?;

        let authorization_code = unescape(raw);
        if authorization_code.trim().is_empty() {
            return Err(Error::MissingAuthorizationCode);
        }

        let redirect_uri = params
            .authorization_data
            .as_ref()
            .and_then(|data| data.redirect_uri.clone())
            .unwrap_or_default();

        Ok(Self {
            authorization_code,
            redirect_uri,
        })
    }

    pub fn authorization_code(&self) -> &str {
        &self.authorization_code
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

/// Percent-decode a code. `+` is left alone; malformed escapes pass through
/// as-is and invalid UTF-8 is replaced rather than rejected.
fn unescape(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}
