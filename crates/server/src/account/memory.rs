use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use time::OffsetDateTime;

use super::{Account, AccountPolicy, AccountStore, NewAccount, Role, normalize_username, password};
use crate::error::StoreError;

/// Process-local account store.
///
/// Counter updates go through the `DashMap` shard lock for the account, so
/// concurrent failures on the same account never lose an increment.
pub struct InMemoryAccountStore {
    policy: AccountPolicy,
    accounts: DashMap<i32, Account>,
    by_username: DashMap<String, i32>,
    roles: DashMap<String, Role>,
    account_roles: DashMap<i32, Vec<Role>>,
    next_account_id: AtomicI32,
    next_role_id: AtomicI32,
}

impl InMemoryAccountStore {
    pub fn new(policy: AccountPolicy) -> Self {
        Self {
            policy,
            accounts: DashMap::new(),
            by_username: DashMap::new(),
            roles: DashMap::new(),
            account_roles: DashMap::new(),
            next_account_id: AtomicI32::new(1),
            next_role_id: AtomicI32::new(1),
        }
    }

    /// Create an account, hashing its password and assigning a fresh security stamp.
    pub fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        let password_hash = password::hash_password(&new.password)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
        let security_stamp = password::generate_security_stamp()?;

        let slot = match self.by_username.entry(normalize_username(&new.username)) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateUsername(new.username)),
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_account_id.fetch_add(1, Ordering::Relaxed);
        let account = Account {
            id,
            username: new.username,
            email: new.email,
            email_confirmed: new.email_confirmed,
            password_hash,
            security_stamp,
            lockout_enabled: new.lockout_enabled,
            lockout_end: new.lockout_end,
            failed_attempt_count: 0,
            two_factor_enabled: new.two_factor_enabled,
        };

        let roles = new.roles.iter().map(|name| self.role(name)).collect();
        self.account_roles.insert(id, roles);
        self.accounts.insert(id, account.clone());
        slot.insert(id);

        tracing::debug!(account_id = id, username = %account.username, "Account created");
        Ok(account)
    }

    /// Current state of an account, if it exists.
    pub fn get(&self, id: i32) -> Option<Account> {
        self.accounts.get(&id).map(|a| a.value().clone())
    }

    fn role(&self, name: &str) -> Role {
        self.roles
            .entry(name.to_string())
            .or_insert_with(|| Role {
                id: self.next_role_id.fetch_add(1, Ordering::Relaxed),
                name: name.to_string(),
            })
            .value()
            .clone()
    }

    fn current(&self, account: &Account) -> Result<Account, StoreError> {
        self.get(account.id)
            .ok_or(StoreError::AccountNotFound(account.id))
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let Some(id) = self.by_username.get(&normalize_username(username)).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.get(id))
    }

    async fn can_sign_in(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.policy.can_sign_in(account))
    }

    fn supports_two_factor(&self) -> bool {
        self.policy.two_factor_supported
    }

    async fn is_two_factor_enabled(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.current(account)?.two_factor_enabled)
    }

    fn supports_lockout(&self) -> bool {
        self.policy.lockout_enabled
    }

    async fn is_locked_out(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.current(account)?.is_locked_out_at(OffsetDateTime::now_utc()))
    }

    async fn check_password(&self, account: &Account, password: &str) -> Result<bool, StoreError> {
        let hash = account.password_hash.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| StoreError::PasswordHash(e.to_string()))
    }

    async fn record_failed_attempt(&self, account: &Account) -> Result<(), StoreError> {
        let mut entry = self
            .accounts
            .get_mut(&account.id)
            .ok_or(StoreError::AccountNotFound(account.id))?;
        entry.failed_attempt_count += 1;
        if let Some(end) = self
            .policy
            .lockout_end_after(entry.failed_attempt_count, OffsetDateTime::now_utc())
        {
            entry.lockout_end = Some(end);
            tracing::info!(account_id = account.id, "Account locked out");
        }
        Ok(())
    }

    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), StoreError> {
        let mut entry = self
            .accounts
            .get_mut(&account.id)
            .ok_or(StoreError::AccountNotFound(account.id))?;
        entry.failed_attempt_count = 0;
        Ok(())
    }

    async fn roles(&self, account: &Account) -> Result<Vec<Role>, StoreError> {
        Ok(self
            .account_roles
            .get(&account.id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}
