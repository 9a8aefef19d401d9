//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use auth_server::account::{
    Account, AccountPolicy, AccountStore, InMemoryAccountStore, NewAccount, Role,
};
use auth_server::appender::ClaimsAppenderPipeline;
use auth_server::claims::RoleDestinationRule;
use auth_server::error::StoreError;
use auth_server::service::TokenExchangeService;
use auth_server::strategy::DefaultAuthenticationStrategy;

pub const PASSWORD: &str = "correct horse battery staple";

pub fn memory_store() -> Arc<InMemoryAccountStore> {
    Arc::new(InMemoryAccountStore::new(AccountPolicy::default()))
}

pub fn memory_store_with(policy: AccountPolicy) -> Arc<InMemoryAccountStore> {
    Arc::new(InMemoryAccountStore::new(policy))
}

/// Alice: confirmed email, two roles, no 2FA, not locked.
pub fn seed_alice(store: &InMemoryAccountStore) -> Account {
    store
        .insert(
            NewAccount::new("alice", PASSWORD)
                .email("alice@example.org", true)
                .role("admin")
                .role("user"),
        )
        .expect("seed alice")
}

pub fn service(
    store: Arc<dyn AccountStore>,
    appenders: ClaimsAppenderPipeline,
) -> TokenExchangeService {
    TokenExchangeService::new(
        Arc::new(DefaultAuthenticationStrategy::new(store)),
        RoleDestinationRule::default(),
        appenders,
    )
}

/// Delegating store that counts password checks.
pub struct CountingStore {
    pub inner: Arc<InMemoryAccountStore>,
    pub password_checks: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<InMemoryAccountStore>) -> Self {
        Self {
            inner,
            password_checks: AtomicUsize::new(0),
        }
    }

    pub fn password_checks(&self) -> usize {
        self.password_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for CountingStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.inner.find_by_username(username).await
    }

    async fn can_sign_in(&self, account: &Account) -> Result<bool, StoreError> {
        self.inner.can_sign_in(account).await
    }

    fn supports_two_factor(&self) -> bool {
        self.inner.supports_two_factor()
    }

    async fn is_two_factor_enabled(&self, account: &Account) -> Result<bool, StoreError> {
        self.inner.is_two_factor_enabled(account).await
    }

    fn supports_lockout(&self) -> bool {
        self.inner.supports_lockout()
    }

    async fn is_locked_out(&self, account: &Account) -> Result<bool, StoreError> {
        self.inner.is_locked_out(account).await
    }

    async fn check_password(&self, account: &Account, password: &str) -> Result<bool, StoreError> {
        self.password_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.check_password(account, password).await
    }

    async fn record_failed_attempt(&self, account: &Account) -> Result<(), StoreError> {
        self.inner.record_failed_attempt(account).await
    }

    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), StoreError> {
        self.inner.reset_failed_attempts(account).await
    }

    async fn roles(&self, account: &Account) -> Result<Vec<Role>, StoreError> {
        self.inner.roles(account).await
    }
}
