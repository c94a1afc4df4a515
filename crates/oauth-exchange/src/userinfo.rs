//! Profile fetch with an issued access token

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::provider::ProviderStrategy;
use crate::token::AccessToken;
use crate::transport::Transport;

/// Provider profile record.
///
/// The shape is provider-defined; the only field every strategy guarantees is
/// a non-empty identifier, exposed via `id()`. Serializes as the raw field map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserInfo {
    fields: Map<String, Value>,
    #[serde(skip)]
    id: String,
}

impl UserInfo {
    /// Build from a JSON object, reading the identifier from the first of
    /// `id_fields` holding a non-empty string or a number.
    pub fn from_fields(fields: Map<String, Value>, id_fields: &[&str]) -> Option<Self> {
        let id = id_fields.iter().find_map(|name| match fields.get(*name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })?;
        Some(Self { fields, id })
    }

    /// Stable provider-side user identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Convenience accessor for string fields such as `email` or `name`.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() || self.id.is_empty()
    }
}

/// Fetch the user's profile from the provider.
///
/// A blank token is refused before any request is made. Transport failures
/// surface as `Transport`; non-2xx statuses and bodies the strategy can not
/// parse are `UserInfoFetchFailed`.
pub async fn fetch(
    transport: &dyn Transport,
    strategy: &dyn ProviderStrategy,
    token: &AccessToken,
) -> Result<UserInfo> {
    if token.is_empty() {
        return Err(Error::UserInfoFetchFailed("access token is empty".into()));
    }

    let response = transport.send(strategy.user_info_request(token)).await?;

    if !response.is_success() {
        warn!(
            provider = strategy.name(),
            status = response.status,
            "user info endpoint rejected the access token"
        );
        return Err(Error::UserInfoFetchFailed(format!(
            "user info endpoint returned {}",
            response.status
        )));
    }

    let info = strategy.parse_user_info(&response.body)?;
    debug!(provider = strategy.name(), "user info fetched");
    Ok(info)
}
