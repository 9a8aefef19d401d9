use std::sync::Arc;

use async_trait::async_trait;

use crate::account::{Account, AccountStore};
use crate::claims::{AccountClaimsFactory, Claim, ClaimsIdentityFactory, Principal, claim_types};
use crate::error::{AuthenticationError, PipelineError};
use crate::validator::CredentialValidator;

/// Hooks the token exchange calls into.
///
/// Swap in a different implementation to change how credentials are checked,
/// how the baseline principal is produced, or which claims are withheld.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Result<Account, AuthenticationError>, PipelineError>;

    async fn create_user_principal(&self, account: &Account) -> Result<Principal, PipelineError>;

    /// Claims for which this returns true get no destinations.
    fn should_exclude_claim(&self, claim: &Claim) -> bool;
}

pub struct DefaultAuthenticationStrategy {
    validator: CredentialValidator,
    identity: Arc<dyn ClaimsIdentityFactory>,
}

impl DefaultAuthenticationStrategy {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            validator: CredentialValidator::new(store.clone()),
            identity: Arc::new(AccountClaimsFactory::new(store)),
        }
    }

    pub fn with_identity_factory(mut self, identity: Arc<dyn ClaimsIdentityFactory>) -> Self {
        self.identity = identity;
        self
    }
}

#[async_trait]
impl AuthenticationStrategy for DefaultAuthenticationStrategy {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Result<Account, AuthenticationError>, PipelineError> {
        self.validator.validate(username, password).await
    }

    async fn create_user_principal(&self, account: &Account) -> Result<Principal, PipelineError> {
        Ok(self.identity.create(account).await?)
    }

    fn should_exclude_claim(&self, claim: &Claim) -> bool {
        claim.is_type(claim_types::SECURITY_STAMP)
    }
}
