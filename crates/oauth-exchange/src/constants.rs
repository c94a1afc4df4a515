//! Provider endpoint defaults and protocol constants
//!
//! Endpoint URLs are public and may be overridden per provider in the
//! configuration file. Client credentials never live here; they are loaded
//! into the credential store at process start.

use std::time::Duration;

/// `grant_type` sent on every code exchange
pub const GRANT_TYPE: &str = "authorization_code";

/// Google token endpoint
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Google profile endpoint (v2 userinfo, identifier field `id`)
pub const GOOGLE_USER_INFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Facebook Graph API token endpoint
pub const FACEBOOK_TOKEN_ENDPOINT: &str = "https://graph.facebook.com/v19.0/oauth/access_token";

/// Facebook Graph API profile endpoint
pub const FACEBOOK_USER_INFO_ENDPOINT: &str = "https://graph.facebook.com/v19.0/me";

/// Profile fields requested from the Graph API
pub const FACEBOOK_PROFILE_FIELDS: &str = "id,name,email";

/// Per-request timeout applied to both provider calls unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
