//! OAuth login runner
//!
//! Completes one authorization-code login from the command line:
//! 1. Loads provider configuration and client secrets
//! 2. Builds inbound parameters from `--code` / `--redirect-uri`
//! 3. Runs one exchange session against the chosen provider
//! 4. Prints the outcome JSON; exits 0 when authorized, 1 otherwise

use std::process::ExitCode;

use anyhow::{Context, Result};
use oauth_exchange::{AuthOutcome, Config, InboundParams, OAuthSession, ReqwestTransport};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<String>,
    provider: Option<String>,
    code: Option<String>,
    redirect_uri: Option<String>,
}

impl Args {
    /// Simple `--flag value` parsing; unknown flags are ignored. A flag
    /// followed by another flag has no value.
    fn parse(args: &[String]) -> Self {
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .filter(|v| !v.starts_with("--"))
                .cloned()
        };
        Self {
            config: value_of("--config"),
            provider: value_of("--provider"),
            code: value_of("--code"),
            redirect_uri: value_of("--redirect-uri"),
        }
    }

    fn inbound_params(&self) -> InboundParams {
        InboundParams::new(
            self.code.clone().unwrap_or_default(),
            self.redirect_uri.clone().unwrap_or_default(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout carries only the outcome JSON
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse(&std::env::args().collect::<Vec<_>>());

    let config_path = Config::resolve_path(args.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let registry = config
        .registry()
        .context("failed to build provider registry")?;

    info!(
        providers = ?registry.names(),
        timeout_secs = config.http.timeout_secs,
        "configuration loaded"
    );

    let provider = args
        .provider
        .as_deref()
        .context("--provider is required")?;

    let transport =
        ReqwestTransport::new(config.timeout()).context("failed to build HTTP transport")?;

    let outcome = match OAuthSession::for_provider(&registry, provider, &args.inbound_params()) {
        Ok(session) => session.run(&transport).await.into_outcome(),
        Err(e) => AuthOutcome::failed(&e),
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(if outcome.authorized {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth_exchange::ExchangeRequest;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::parse(&argv(&[
            "oauth-login",
            "--config",
            "/etc/oauth-login.toml",
            "--provider",
            "google",
            "--code",
            "4%2Fabc123",
            "--redirect-uri",
            "https://app.example/cb",
        ]));
        assert_eq!(args.config.as_deref(), Some("/etc/oauth-login.toml"));
        assert_eq!(args.provider.as_deref(), Some("google"));
        assert_eq!(args.code.as_deref(), Some("4%2Fabc123"));
        assert_eq!(args.redirect_uri.as_deref(), Some("https://app.example/cb"));
    }

    #[test]
    fn missing_flags_are_none() {
        let args = Args::parse(&argv(&["oauth-login", "--provider"]));
        assert_eq!(args, Args::default());
    }

    #[test]
    fn flag_is_not_taken_as_a_value() {
        let args = Args::parse(&argv(&["oauth-login", "--code", "--redirect-uri", "x"]));
        assert_eq!(args.code, None);
        assert_eq!(args.redirect_uri.as_deref(), Some("x"));

        let err = ExchangeRequest::from_params(&args.inbound_params()).unwrap_err();
        let json = serde_json::to_value(AuthOutcome::failed(&err)).unwrap();
        assert_eq!(json["error"]["kind"], "missing_authorization_code");
    }

    #[test]
    fn inbound_params_are_unescaped_by_the_exchange() {
        let args = Args::parse(&argv(&["oauth-login", "--code", "4%2Fabc123"]));
        let request = ExchangeRequest::from_params(&args.inbound_params()).unwrap();
        assert_eq!(request.authorization_code(), "4/abc123");
        assert_eq!(request.redirect_uri(), "");
    }

    #[test]
    fn missing_code_yields_failed_outcome() {
        let args = Args::parse(&argv(&["oauth-login", "--provider", "google"]));
        let err = ExchangeRequest::from_params(&args.inbound_params()).unwrap_err();
        let outcome = AuthOutcome::failed(&err);
        assert!(!outcome.authorized);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"]["kind"], "missing_authorization_code");
    }

    #[tokio::test]
    async fn unknown_provider_yields_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("secret");
        std::fs::write(&secret, "s").unwrap();
        let path = dir.path().join("oauth-login.toml");
        std::fs::write(
            &path,
            format!(
                "[providers.google]\nclient_id = \"id\"\nclient_secret_file = \"{}\"\n",
                secret.display()
            ),
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        let registry = config.registry().unwrap();
        let result = OAuthSession::for_provider(
            &registry,
            "facebook",
            &InboundParams::new("code", "https://app.example/cb"),
        );
        let outcome = match result {
            Ok(_) => panic!("facebook is not configured"),
            Err(e) => AuthOutcome::failed(&e),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"]["kind"], "unknown_provider");
    }
}
