//! Per-provider client credentials
//!
//! Built once at process start (usually from the configuration file) and
//! shared read-only behind an `Arc` for the life of the process. There is no
//! interior mutability: concurrent sessions only ever read from the store.

use std::collections::HashMap;

use common::Secret;

use crate::constants::GRANT_TYPE;

/// A single provider's OAuth client registration.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    client_id: String,
    client_secret: Secret<String>,
}

impl ProviderCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret<String>>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Raw client secret, for the token request body only.
    pub fn client_secret(&self) -> &str {
        self.client_secret.expose()
    }

    /// Always `authorization_code`.
    pub fn grant_type(&self) -> &'static str {
        GRANT_TYPE
    }

    /// Both id and secret are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.is_blank()
    }
}

/// Read-only map of provider name to credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, ProviderCredentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register credentials for a provider.
    ///
    /// Incomplete credentials are refused so every strategy built from the
    /// store can send a fully populated token request.
    pub fn insert(
        &mut self,
        provider: impl Into<String>,
        credentials: ProviderCredentials,
    ) -> common::Result<()> {
        let provider = provider.into().to_ascii_lowercase();
        if !credentials.is_complete() {
            return Err(common::Error::Config(format!(
                "provider {provider} needs a non-empty client_id and client_secret"
            )));
        }
        self.entries.insert(provider, credentials);
        Ok(())
    }

    /// Look up credentials by provider name (case-insensitive).
    pub fn get(&self, provider: &str) -> Option<&ProviderCredentials> {
        self.entries.get(&provider.to_ascii_lowercase())
    }

    /// Names of all configured providers, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_carry_constant_grant_type() {
        let creds = ProviderCredentials::new("client-1", "secret-1");
        assert_eq!(creds.client_id(), "client-1");
        assert_eq!(creds.client_secret(), "secret-1");
        assert_eq!(creds.grant_type(), "authorization_code");
        assert!(creds.is_complete());
    }

    #[test]
    fn debug_output_hides_secret() {
        let creds = ProviderCredentials::new("client-1", "super-secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("client-1"));
        assert!(!debug.contains("super-secret"), "got: {debug}");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut store = CredentialStore::new();
        store
            .insert("Google", ProviderCredentials::new("gid", "gsecret"))
            .unwrap();
        assert_eq!(store.get("google").unwrap().client_id(), "gid");
        assert_eq!(store.get("GOOGLE").unwrap().client_id(), "gid");
        assert!(store.get("facebook").is_none());
    }

    #[test]
    fn incomplete_credentials_are_refused() {
        let mut store = CredentialStore::new();
        assert!(
            store
                .insert("google", ProviderCredentials::new("", "secret"))
                .is_err()
        );
        assert!(
            store
                .insert("google", ProviderCredentials::new("id", "  "))
                .is_err()
        );
        assert!(store.is_empty());
    }

    #[test]
    fn providers_are_listed_sorted() {
        let mut store = CredentialStore::new();
        store
            .insert("google", ProviderCredentials::new("g", "gs"))
            .unwrap();
        store
            .insert("facebook", ProviderCredentials::new("f", "fs"))
            .unwrap();
        assert_eq!(store.providers(), vec!["facebook", "google"]);
        assert_eq!(store.len(), 2);
    }
}
