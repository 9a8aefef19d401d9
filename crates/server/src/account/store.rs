use async_trait::async_trait;

use super::{Account, Role};
use crate::error::StoreError;

/// Persistence boundary for accounts.
///
/// Implementations own the account record and are responsible for making
/// counter updates atomic under concurrent requests.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Sign-in eligibility (confirmed email and similar account-level gates).
    async fn can_sign_in(&self, account: &Account) -> Result<bool, StoreError>;

    fn supports_two_factor(&self) -> bool;

    async fn is_two_factor_enabled(&self, account: &Account) -> Result<bool, StoreError>;

    fn supports_lockout(&self) -> bool;

    async fn is_locked_out(&self, account: &Account) -> Result<bool, StoreError>;

    async fn check_password(&self, account: &Account, password: &str) -> Result<bool, StoreError>;

    /// Increment the failed-attempt counter, locking the account once it reaches the limit.
    async fn record_failed_attempt(&self, account: &Account) -> Result<(), StoreError>;

    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), StoreError>;

    async fn roles(&self, account: &Account) -> Result<Vec<Role>, StoreError>;
}
