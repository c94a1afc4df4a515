//! Provider strategies
//!
//! Each identity provider is one type implementing `ProviderStrategy`. A
//! strategy only knows its two endpoints, its client credentials, and how to
//! read that provider's responses; the session drives the flow and never
//! branches on which provider it holds. Adding a provider means adding one
//! strategy type and one `ProviderKind` variant.

pub mod facebook;
pub mod google;

pub use facebook::Facebook;
pub use google::Google;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credentials::{CredentialStore, ProviderCredentials};
use crate::error::{Error, Result};
use crate::token::AccessToken;
use crate::transport::OutboundRequest;
use crate::userinfo::UserInfo;

/// Supported identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    Facebook,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Google, ProviderKind::Facebook];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Facebook => "facebook",
        }
    }

    /// Default (token, user info) endpoints.
    pub fn default_endpoints(&self) -> (&'static str, &'static str) {
        match self {
            ProviderKind::Google => (
                crate::constants::GOOGLE_TOKEN_ENDPOINT,
                crate::constants::GOOGLE_USER_INFO_ENDPOINT,
            ),
            ProviderKind::Facebook => (
                crate::constants::FACEBOOK_TOKEN_ENDPOINT,
                crate::constants::FACEBOOK_USER_INFO_ENDPOINT,
            ),
        }
    }

    /// Build this provider's strategy.
    pub fn strategy(
        &self,
        credentials: ProviderCredentials,
        token_endpoint: impl Into<String>,
        user_info_endpoint: impl Into<String>,
    ) -> Arc<dyn ProviderStrategy> {
        match self {
            ProviderKind::Google => Arc::new(Google::with_endpoints(
                credentials,
                token_endpoint,
                user_info_endpoint,
            )),
            ProviderKind::Facebook => Arc::new(Facebook::with_endpoints(
                credentials,
                token_endpoint,
                user_info_endpoint,
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "facebook" => Ok(ProviderKind::Facebook),
            _ => Err(Error::UnknownProvider(s.to_string())),
        }
    }
}

/// Provider-specific half of the exchange.
///
/// Implementations are immutable after construction and shared across
/// concurrent sessions.
pub trait ProviderStrategy: Send + Sync {
    /// Provider name for logging and registry lookup (e.g. "google")
    fn name(&self) -> &'static str;

    fn token_endpoint(&self) -> &str;

    fn user_info_endpoint(&self) -> &str;

    fn credentials(&self) -> &ProviderCredentials;

    /// Extract the access token from a successful token response.
    ///
    /// Default: a JSON object with a string `access_token` field.
    fn parse_access_token(&self, body: &str) -> Option<AccessToken> {
        json_access_token(body)
    }

    /// Parse the profile body into `UserInfo`.
    fn parse_user_info(&self, body: &str) -> Result<UserInfo>;

    /// Request that presents `token` to the user-info endpoint.
    ///
    /// Default: GET with an `Authorization: Bearer` header.
    fn user_info_request(&self, token: &AccessToken) -> OutboundRequest {
        OutboundRequest::get(self.user_info_endpoint()).with_bearer(token.value())
    }
}

/// `access_token` string from a JSON object body, if any.
pub(crate) fn json_access_token(body: &str) -> Option<AccessToken> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("access_token")
        .and_then(Value::as_str)
        .map(AccessToken::new)
}

/// JSON object body with an identifier in one of `id_fields`.
pub(crate) fn json_user_info(body: &str, id_fields: &[&str]) -> Result<UserInfo> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::UserInfoFetchFailed(format!("invalid user info body: {e}")))?;
    let Value::Object(fields) = value else {
        return Err(Error::UserInfoFetchFailed(
            "user info body is not a JSON object".into(),
        ));
    };
    UserInfo::from_fields(fields, id_fields).ok_or_else(|| {
        Error::UserInfoFetchFailed(format!(
            "user info has no identifier (expected one of: {})",
            id_fields.join(", ")
        ))
    })
}

/// Strategies by provider name.
///
/// Built once at process start and shared read-only; `select` is the only
/// place a provider name is turned into behaviour.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    strategies: HashMap<&'static str, Arc<dyn ProviderStrategy>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One strategy per provider in `store`, using default endpoints.
    /// Entries whose name is not a known provider are skipped.
    pub fn from_store(store: &CredentialStore) -> Self {
        let mut registry = Self::new();
        for kind in ProviderKind::ALL {
            if let Some(credentials) = store.get(kind.as_str()) {
                let (token, user_info) = kind.default_endpoints();
                registry.register(kind.strategy(credentials.clone(), token, user_info));
            }
        }
        registry
    }

    /// Add or replace the strategy registered under `strategy.name()`.
    pub fn register(&mut self, strategy: Arc<dyn ProviderStrategy>) {
        self.strategies.insert(strategy.name(), strategy);
    }

    /// Select a strategy by name (case-insensitive).
    pub fn select(&self, name: &str) -> Result<Arc<dyn ProviderStrategy>> {
        self.strategies
            .get(name.trim().to_ascii_lowercase().as_str())
            .cloned()
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.strategies.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_credentials;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!(" Facebook ".parse::<ProviderKind>().unwrap(), ProviderKind::Facebook);
        assert!(matches!(
            "github".parse::<ProviderKind>(),
            Err(Error::UnknownProvider(name)) if name == "github"
        ));
    }

    #[test]
    fn kind_names_round_trip_through_display() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn default_access_token_parsing() {
        assert_eq!(
            json_access_token(r#"{"access_token":"tok_xyz","token_type":"Bearer"}"#)
                .unwrap()
                .value(),
            "tok_xyz"
        );
        assert!(json_access_token(r#"{"error":"invalid_grant"}"#).is_none());
        assert!(json_access_token(r#"{"access_token":42}"#).is_none());
        assert!(json_access_token("access_token=tok").is_none());
    }

    #[test]
    fn registry_selects_by_name() {
        let mut store = CredentialStore::new();
        store.insert("google", test_credentials()).unwrap();
        let registry = ProviderRegistry::from_store(&store);

        let strategy = registry.select("Google").unwrap();
        assert_eq!(strategy.name(), "google");
        assert_eq!(strategy.token_endpoint(), crate::constants::GOOGLE_TOKEN_ENDPOINT);
        assert_eq!(strategy.credentials().client_id(), "test-client-id");

        assert!(matches!(
            registry.select("facebook"),
            Err(Error::UnknownProvider(_))
        ));
    }

    #[test]
    fn registry_skips_unknown_store_entries() {
        let mut store = CredentialStore::new();
        store.insert("github", test_credentials()).unwrap();
        store.insert("facebook", test_credentials()).unwrap();
        let registry = ProviderRegistry::from_store(&store);
        assert_eq!(registry.names(), vec!["facebook"]);
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::Google.strategy(
            test_credentials(),
            "https://a.test/token",
            "https://a.test/me",
        ));
        registry.register(ProviderKind::Google.strategy(
            test_credentials(),
            "https://b.test/token",
            "https://b.test/me",
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.select("google").unwrap().token_endpoint(),
            "https://b.test/token"
        );
    }
}
