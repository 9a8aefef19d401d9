use serde::Deserialize;
use thiserror::Error;

use crate::claims::RoleDestinationRule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Account lockout policy applied by the account stores.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LockoutConfig {
    pub enabled: bool,
    /// Failed password checks before the account is locked.
    pub max_failed_attempts: i32,
    pub lockout_duration_secs: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failed_attempts: 5,
            lockout_duration_secs: 300,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SignInConfig {
    /// Accounts without a confirmed email address may not sign in.
    pub require_confirmed_email: bool,
    /// When false the store reports no two-factor support and the 2FA gate is skipped.
    pub two_factor_supported: bool,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            require_confirmed_email: false,
            two_factor_supported: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenConfig {
    /// Value of the `iss` claim in issued tokens.
    pub issuer: String,
    /// HMAC secret for the JWT issuer. At least 32 bytes.
    pub signing_secret: String,
    /// Access token lifetime in seconds (defaults to 7 days).
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    pub role_destination: RoleDestinationRule,
    /// Register the sub-account appender in the claims pipeline.
    pub sub_account_appender: bool,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            role_destination: RoleDestinationRule::default(),
            sub_account_appender: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// sea-orm connection string, or `memory:` for the in-process store.
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub lockout: LockoutConfig,
    #[serde(default)]
    pub sign_in: SignInConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub claims: ClaimsConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_access_token_lifetime() -> i64 {
    7 * 24 * 3600
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.signing_secret.len() < 32 {
            return Err(ConfigError::Validation(
                "token.signing_secret must be at least 32 characters".into(),
            ));
        }
        if self.token.access_token_lifetime <= 0 {
            return Err(ConfigError::Validation(
                "token.access_token_lifetime must be > 0".into(),
            ));
        }
        if self.lockout.max_failed_attempts <= 0 {
            return Err(ConfigError::Validation(
                "lockout.max_failed_attempts must be > 0".into(),
            ));
        }
        if self.lockout.lockout_duration_secs <= 0 {
            return Err(ConfigError::Validation(
                "lockout.lockout_duration_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Whether accounts live in the in-process store instead of a database.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == "memory:"
    }
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Environment variables prefixed with `AUTH__` override file values, with `__`
/// separating nested keys (e.g. `AUTH__LOCKOUT__MAX_FAILED_ATTEMPTS=3`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::with_prefix("AUTH").separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;

    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(yaml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
database_url: "memory:"
token:
  issuer: "https://auth.example.org"
  signing_secret: "0123456789abcdef0123456789abcdef"
"#;

    #[test]
    fn defaults_are_applied() {
        let cfg = parse(MINIMAL);
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert!(cfg.lockout.enabled);
        assert_eq!(cfg.lockout.max_failed_attempts, 5);
        assert_eq!(cfg.lockout.lockout_duration_secs, 300);
        assert!(cfg.sign_in.two_factor_supported);
        assert!(!cfg.sign_in.require_confirmed_email);
        assert_eq!(cfg.token.access_token_lifetime, 604_800);
        assert_eq!(cfg.claims.role_destination, RoleDestinationRule::RoleClaimScope);
        assert!(cfg.claims.sub_account_appender);
        assert!(cfg.uses_memory_store());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn short_secret_is_rejected() {
        let mut cfg = parse(MINIMAL);
        cfg.token.signing_secret = "short".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut cfg = parse(MINIMAL);
        cfg.lockout.max_failed_attempts = 0;
        assert!(cfg.validate().is_err());
    }
}
