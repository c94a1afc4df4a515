//! Provider configuration loading
//!
//! Settings come from the TOML file, with defaults for anything left out.
//! Only two things are overridable: the file path (`--config`, then
//! `CONFIG_PATH`, then `oauth-login.toml`) and the client secrets
//! (`OAUTH_<PROVIDER>_CLIENT_SECRET`, then `client_secret_file`). Secrets are
//! never read from the TOML itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use common::Secret;
use serde::Deserialize;
use tracing::debug;

use crate::credentials::{CredentialStore, ProviderCredentials};
use crate::provider::{ProviderKind, ProviderRegistry};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// Outbound HTTP settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// One `[providers.<name>]` section
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to the env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub user_info_endpoint: Option<String>,
}

fn default_timeout() -> u64 {
    crate::constants::DEFAULT_TIMEOUT.as_secs()
}

/// Name of the env var holding a provider's client secret.
pub fn secret_env_var(provider: &str) -> String {
    format!("OAUTH_{}_CLIENT_SECRET", provider.to_ascii_uppercase())
}

impl Config {
    /// Load configuration from a TOML file, then resolve client secrets from
    /// the environment or secret files.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.resolve_secrets(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse and validate TOML without touching secrets.
    pub fn parse(contents: &str) -> common::Result<Self> {
        let config: Config = toml::from_str(contents)?;

        if config.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, provider) in &config.providers {
            ProviderKind::from_str(name).map_err(|_| {
                common::Error::Config(format!(
                    "unknown provider section [providers.{name}]"
                ))
            })?;

            if provider.client_id.trim().is_empty() {
                return Err(common::Error::Config(format!(
                    "providers.{name}.client_id must not be empty"
                )));
            }

            for (field, url) in [
                ("token_endpoint", &provider.token_endpoint),
                ("user_info_endpoint", &provider.user_info_endpoint),
            ] {
                let Some(url) = url else { continue };
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(common::Error::Config(format!(
                        "providers.{name}.{field} must start with http:// or https://, got: {url}"
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Fill in each provider's client secret.
    ///
    /// Resolution order:
    /// 1. `OAUTH_<PROVIDER>_CLIENT_SECRET` (via `lookup_env`)
    /// 2. `client_secret_file` path from config
    pub fn resolve_secrets(
        &mut self,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> common::Result<()> {
        for (name, provider) in self.providers.iter_mut() {
            let from_env = lookup_env(&secret_env_var(name)).filter(|s| !s.trim().is_empty());
            if let Some(secret) = from_env {
                debug!(provider = %name, "client secret from environment");
                provider.client_secret = Some(Secret::new(secret));
            } else if let Some(ref file) = provider.client_secret_file {
                let secret = std::fs::read_to_string(file).map_err(|e| {
                    common::Error::Config(format!(
                        "failed to read client_secret_file {}: {e}",
                        file.display()
                    ))
                })?;
                let secret = secret.trim().to_owned();
                if !secret.is_empty() {
                    debug!(provider = %name, "client secret from file");
                    provider.client_secret = Some(Secret::new(secret));
                }
            }

            if provider.client_secret.is_none() {
                return Err(common::Error::Config(format!(
                    "no client secret for provider {name}: set {} or client_secret_file",
                    secret_env_var(name)
                )));
            }
        }
        Ok(())
    }

    /// Per-request timeout for provider calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Credential store for every configured provider.
    pub fn credential_store(&self) -> common::Result<CredentialStore> {
        let mut store = CredentialStore::new();
        for (name, provider) in &self.providers {
            let secret = provider.client_secret.clone().ok_or_else(|| {
                common::Error::Config(format!("client secret for provider {name} not resolved"))
            })?;
            store.insert(
                name.as_str(),
                ProviderCredentials::new(provider.client_id.clone(), secret),
            )?;
        }
        Ok(store)
    }

    /// Registry of strategies, applying any endpoint overrides.
    pub fn registry(&self) -> common::Result<Arc<ProviderRegistry>> {
        let store = self.credential_store()?;
        let mut registry = ProviderRegistry::from_store(&store);
        for (name, provider) in &self.providers {
            let kind = ProviderKind::from_str(name)
                .map_err(|e| common::Error::Config(e.to_string()))?;
            if provider.token_endpoint.is_none() && provider.user_info_endpoint.is_none() {
                continue;
            }
            let credentials = store.get(name).cloned().ok_or_else(|| {
                common::Error::Config(format!("no credentials for provider {name}"))
            })?;
            let (default_token, default_user_info) = kind.default_endpoints();
            registry.register(kind.strategy(
                credentials,
                provider.token_endpoint.as_deref().unwrap_or(default_token),
                provider
                    .user_info_endpoint
                    .as_deref()
                    .unwrap_or(default_user_info),
            ));
        }
        Ok(Arc::new(registry))
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("oauth-login.toml")
    }
}
