//! Facebook login via the Graph API
//!
//! The Graph API takes the access token as a query parameter and only returns
//! the profile fields that are asked for explicitly.

use crate::constants::{
    FACEBOOK_PROFILE_FIELDS, FACEBOOK_TOKEN_ENDPOINT, FACEBOOK_USER_INFO_ENDPOINT,
};
use crate::credentials::ProviderCredentials;
use crate::error::Result;
use crate::provider::{ProviderStrategy, json_user_info};
use crate::token::AccessToken;
use crate::transport::OutboundRequest;
use crate::userinfo::UserInfo;

pub struct Facebook {
    credentials: ProviderCredentials,
    token_endpoint: String,
    user_info_endpoint: String,
}

impl Facebook {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self::with_endpoints(
            credentials,
            FACEBOOK_TOKEN_ENDPOINT,
            FACEBOOK_USER_INFO_ENDPOINT,
        )
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

impl ProviderStrategy for Facebook {
    fn name(&self) -> &'static str {
        "facebook"
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
        json_user_info(body, &["id"])
    }

    fn user_info_request(&self, token: &AccessToken) -> OutboundRequest {
        OutboundRequest::get(self.user_info_endpoint())
            .with_query("fields", FACEBOOK_PROFILE_FIELDS)
            .with_query("access_token", token.value())
    }
}
