use time::{Duration, OffsetDateTime};

use crate::config::AppConfig;

/// A stored account as the credential pipeline sees it.
///
/// The record is owned by an [`AccountStore`](super::AccountStore); the pipeline
/// only reads flags and asks the store to bump or reset the failure counter.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    /// PHC string. Opaque outside the store.
    pub password_hash: String,
    pub security_stamp: String,
    pub lockout_enabled: bool,
    pub lockout_end: Option<OffsetDateTime>,
    pub failed_attempt_count: i32,
    pub two_factor_enabled: bool,
}

impl Account {
    /// Locked iff lockout applies to this account and its end lies in the future.
    pub fn is_locked_out_at(&self, now: OffsetDateTime) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// Lookup key for usernames. Matching is case-insensitive.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_uppercase()
}

/// Store-side policy knobs derived from configuration.
#[derive(Clone, Debug)]
pub struct AccountPolicy {
    pub require_confirmed_email: bool,
    pub two_factor_supported: bool,
    pub lockout_enabled: bool,
    pub max_failed_attempts: i32,
    pub lockout_duration: Duration,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            require_confirmed_email: false,
            two_factor_supported: true,
            lockout_enabled: true,
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(5),
        }
    }
}

impl From<&AppConfig> for AccountPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            require_confirmed_email: config.sign_in.require_confirmed_email,
            two_factor_supported: config.sign_in.two_factor_supported,
            lockout_enabled: config.lockout.enabled,
            max_failed_attempts: config.lockout.max_failed_attempts,
            lockout_duration: Duration::seconds(config.lockout.lockout_duration_secs),
        }
    }
}

impl AccountPolicy {
    pub fn can_sign_in(&self, account: &Account) -> bool {
        !self.require_confirmed_email || account.email_confirmed
    }

    /// Lockout end after `failed_attempts` consecutive failures, if that count trips the limit.
    pub fn lockout_end_after(&self, failed_attempts: i32, now: OffsetDateTime) -> Option<OffsetDateTime> {
        (failed_attempts >= self.max_failed_attempts).then(|| now + self.lockout_duration)
    }
}

/// Seed data for creating an account through a store.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_enabled: bool,
    pub lockout_end: Option<OffsetDateTime>,
    pub roles: Vec<String>,
}

impl NewAccount {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
            email_confirmed: false,
            two_factor_enabled: false,
            lockout_enabled: true,
            lockout_end: None,
            roles: Vec::new(),
        }
    }

    pub fn email(mut self, email: impl Into<String>, confirmed: bool) -> Self {
        self.email = Some(email.into());
        self.email_confirmed = confirmed;
        self
    }

    pub fn two_factor(mut self, enabled: bool) -> Self {
        self.two_factor_enabled = enabled;
        self
    }

    pub fn lockout_enabled(mut self, enabled: bool) -> Self {
        self.lockout_enabled = enabled;
        self
    }

    pub fn locked_until(mut self, end: OffsetDateTime) -> Self {
        self.lockout_end = Some(end);
        self
    }

    pub fn role(mut self, name: impl Into<String>) -> Self {
        self.roles.push(name.into());
        self
    }
}
