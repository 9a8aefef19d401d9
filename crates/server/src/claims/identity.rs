use std::sync::Arc;

use async_trait::async_trait;

use super::{Claim, Principal, claim_types};
use crate::account::{Account, AccountStore};
use crate::error::StoreError;

/// Produces the baseline, unrouted claim set for an account.
#[async_trait]
pub trait ClaimsIdentityFactory: Send + Sync {
    async fn create(&self, account: &Account) -> Result<Principal, StoreError>;
}

/// Builds `sub`, `name`, `email`, the security stamp and one `role` claim per role.
pub struct AccountClaimsFactory {
    store: Arc<dyn AccountStore>,
}

impl AccountClaimsFactory {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClaimsIdentityFactory for AccountClaimsFactory {
    async fn create(&self, account: &Account) -> Result<Principal, StoreError> {
        let mut principal = Principal::new();
        principal.add_claim(Claim::new(claim_types::SUBJECT, account.id.to_string()));
        principal.add_claim(Claim::new(claim_types::NAME, account.username.as_str()));
        if let Some(email) = &account.email {
            principal.add_claim(Claim::new(claim_types::EMAIL, email.as_str()));
        }
        principal.add_claim(Claim::new(
            claim_types::SECURITY_STAMP,
            account.security_stamp.as_str(),
        ));
        for role in self.store.roles(account).await? {
            principal.add_claim(Claim::new(claim_types::ROLE, role.name));
        }
        Ok(principal)
    }
}
