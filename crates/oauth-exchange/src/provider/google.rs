//! Google sign-in
//!
//! Token exchange against `oauth2.googleapis.com`, profile from the v2
//! userinfo endpoint with the token as a bearer header. The v2 profile names
//! its identifier `id`; the OpenID Connect userinfo endpoint uses `sub`, so
//! either is accepted when the endpoint is overridden.

use crate::constants::{GOOGLE_TOKEN_ENDPOINT, GOOGLE_USER_INFO_ENDPOINT};
use crate::credentials::ProviderCredentials;
use crate::error::Result;
use crate::provider::{ProviderStrategy, json_user_info};
use crate::userinfo::UserInfo;

const ID_FIELDS: &[&str] = &["id", "sub"];

pub struct Google {
    credentials: ProviderCredentials,
    token_endpoint: String,
    user_info_endpoint: String,
}

impl Google {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self::with_endpoints(credentials, GOOGLE_TOKEN_ENDPOINT, GOOGLE_USER_INFO_ENDPOINT)
    }

    pub fn with_endpoints(
        credentials: ProviderCredentials,
        token_endpoint: impl Into<String>,
        user_info_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            token_endpoint: token_endpoint.into(),
            user_info_endpoint: user_info_endpoint.into(),
        }
    }
}

impl ProviderStrategy for Google {
    fn name(&self) -> &'static str {
        "google"
    }

    fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    fn user_info_endpoint(&self) -> &str {
        &self.user_info_endpoint
    }

    fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }

    fn parse_user_info(&self, body: &str) -> Result<UserInfo> {
        json_user_info(body, ID_FIELDS)
    }
}
