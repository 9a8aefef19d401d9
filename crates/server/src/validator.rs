use std::sync::Arc;

use crate::account::{Account, AccountStore};
use crate::error::{AuthenticationError, ContractViolation, PipelineError};

/// Runs the ordered credential checks against an [`AccountStore`].
///
/// The outer `Result` carries hard failures (contract violations, store
/// faults). The inner one carries the expected rejections that are turned
/// into OAuth errors.
pub struct CredentialValidator {
    store: Arc<dyn AccountStore>,
}

impl CredentialValidator {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn validate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Result<Account, AuthenticationError>, PipelineError> {
        if username.is_empty() {
            return Err(ContractViolation::EmptyUsername.into());
        }
        if password.is_empty() {
            return Err(ContractViolation::EmptyPassword.into());
        }

        let Some(account) = self.store.find_by_username(username).await? else {
            tracing::debug!("Unknown username");
            return Ok(Err(AuthenticationError::invalid_client()));
        };

        if !self.store.can_sign_in(&account).await? {
            tracing::debug!(account_id = account.id, "Account not allowed to sign in");
            return Ok(Err(AuthenticationError::sign_in_not_allowed()));
        }

        if self.store.supports_two_factor() && self.store.is_two_factor_enabled(&account).await? {
            tracing::debug!(account_id = account.id, "Two-factor sign-in required");
            return Ok(Err(AuthenticationError::sign_in_not_allowed()));
        }

        let lockout = self.store.supports_lockout();
        if lockout && self.store.is_locked_out(&account).await? {
            tracing::debug!(account_id = account.id, "Account is locked out");
            return Ok(Err(AuthenticationError::invalid_credentials()));
        }

        if !self.store.check_password(&account, password).await? {
            if lockout {
                self.store.record_failed_attempt(&account).await?;
            }
            tracing::debug!(account_id = account.id, "Password mismatch");
            return Ok(Err(AuthenticationError::invalid_credentials()));
        }

        if lockout {
            self.store.reset_failed_attempts(&account).await?;
        }

        Ok(Ok(account))
    }
}
