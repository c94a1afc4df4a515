//! OAuth authorization-code exchange
//!
//! Turns a provider-issued authorization code into an access token and the
//! user's profile. Provider differences live behind `ProviderStrategy`; the
//! flow itself is one state machine shared by every provider.
//!
//! Login flow:
//! 1. Process start: `Config::load()` → `Config::registry()` (credentials are
//!    read once and shared read-only)
//! 2. Caller receives `{ oauthData: { code }, authorizationData: { redirect_uri } }`
//! 3. `OAuthSession::for_provider()` validates the code and selects the strategy
//! 4. `OAuthSession::run()` exchanges the code, then fetches the profile
//! 5. Caller reads `is_authorized()` / `user_info()` or `into_outcome()`

pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod request;
pub mod session;
pub mod token;
pub mod transport;
pub mod userinfo;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use credentials::{CredentialStore, ProviderCredentials};
pub use error::{Error, ErrorKind, Result};
pub use provider::{Facebook, Google, ProviderKind, ProviderRegistry, ProviderStrategy};
pub use request::{ExchangeRequest, InboundParams};
pub use session::{AuthOutcome, OAuthSession, SessionState};
pub use token::{AccessToken, exchange};
pub use transport::{HttpResponse, OutboundRequest, ReqwestTransport, Transport};
pub use userinfo::{UserInfo, fetch};
