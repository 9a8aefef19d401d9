use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, RelationTrait, sea_query::Expr,
};
use time::OffsetDateTime;

use super::{Account, AccountPolicy, AccountStore, NewAccount, Role, normalize_username, password};
use crate::entity::{account, account_role, role};
use crate::error::StoreError;

/// Account store backed by sea-orm (sqlite or postgres).
pub struct SeaOrmAccountStore {
    db: Arc<DatabaseConnection>,
    policy: AccountPolicy,
}

impl SeaOrmAccountStore {
    pub fn new(db: Arc<DatabaseConnection>, policy: AccountPolicy) -> Self {
        Self { db, policy }
    }

    /// Create an account and attach its roles, creating missing roles on the way.
    #[tracing::instrument(skip(self, new), fields(username = %new.username))]
    pub async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let normalized = normalize_username(&new.username);
        if account::Entity::find()
            .filter(account::Column::NormalizedUsername.eq(normalized.as_str()))
            .one(self.db.as_ref())
            .await?
            .is_some()
        {
            return Err(StoreError::DuplicateUsername(new.username));
        }

        let plain = new.password;
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;

        let model = account::ActiveModel {
            username: Set(new.username),
            normalized_username: Set(normalized),
            email: Set(new.email),
            email_confirmed: Set(new.email_confirmed),
            password_hash: Set(password_hash),
            security_stamp: Set(password::generate_security_stamp()?),
            lockout_enabled: Set(new.lockout_enabled),
            lockout_end: Set(new.lockout_end),
            access_failed_count: Set(0),
            two_factor_enabled: Set(new.two_factor_enabled),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        for name in &new.roles {
            let role = self.find_or_create_role(name).await?;
            account_role::Entity::insert(account_role::ActiveModel {
                account_id: Set(model.id),
                role_id: Set(role.id),
            })
            .exec_without_returning(self.db.as_ref())
            .await?;
        }

        tracing::info!(account_id = model.id, "Account created");
        Ok(model.into())
    }

    async fn find_or_create_role(&self, name: &str) -> Result<role::Model, StoreError> {
        if let Some(existing) = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?
        {
            return Ok(existing);
        }
        Ok(role::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?)
    }

    async fn load(&self, id: i32) -> Result<account::Model, StoreError> {
        account::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(StoreError::AccountNotFound(id))
    }

    /// Current state of an account, if it exists.
    pub async fn get(&self, id: i32) -> Result<Option<Account>, StoreError> {
        Ok(account::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Into::into))
    }
}

#[async_trait]
impl AccountStore for SeaOrmAccountStore {
    #[tracing::instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(account::Entity::find()
            .filter(account::Column::NormalizedUsername.eq(normalize_username(username)))
            .one(self.db.as_ref())
            .await?
            .map(Into::into))
    }

    async fn can_sign_in(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.policy.can_sign_in(account))
    }

    fn supports_two_factor(&self) -> bool {
        self.policy.two_factor_supported
    }

    async fn is_two_factor_enabled(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.load(account.id).await?.two_factor_enabled)
    }

    fn supports_lockout(&self) -> bool {
        self.policy.lockout_enabled
    }

    async fn is_locked_out(&self, account: &Account) -> Result<bool, StoreError> {
        let current: Account = self.load(account.id).await?.into();
        Ok(current.is_locked_out_at(OffsetDateTime::now_utc()))
    }

    #[tracing::instrument(skip(self, account, password), fields(account_id = account.id))]
    async fn check_password(&self, account: &Account, password: &str) -> Result<bool, StoreError> {
        let hash = account.password_hash.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| StoreError::PasswordHash(e.to_string()))
    }

    #[tracing::instrument(skip(self, account), fields(account_id = account.id))]
    async fn record_failed_attempt(&self, account: &Account) -> Result<(), StoreError> {
        // Single UPDATE so concurrent failures cannot lose an increment.
        let result = account::Entity::update_many()
            .col_expr(
                account::Column::AccessFailedCount,
                Expr::col(account::Column::AccessFailedCount).add(1),
            )
            .filter(account::Column::Id.eq(account.id))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::AccountNotFound(account.id));
        }

        let current = self.load(account.id).await?;
        let now = OffsetDateTime::now_utc();
        if let Some(end) = self.policy.lockout_end_after(current.access_failed_count, now) {
            let mut active = current.into_active_model();
            active.lockout_end = Set(Some(end));
            active.update(self.db.as_ref()).await?;
            tracing::info!(account_id = account.id, "Account locked out");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, account), fields(account_id = account.id))]
    async fn reset_failed_attempts(&self, account: &Account) -> Result<(), StoreError> {
        account::Entity::update_many()
            .col_expr(account::Column::AccessFailedCount, Expr::value(0))
            .filter(account::Column::Id.eq(account.id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn roles(&self, account: &Account) -> Result<Vec<Role>, StoreError> {
        let roles = role::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                role::Relation::AccountRoles.def(),
            )
            .filter(account_role::Column::AccountId.eq(account.id))
            .order_by_asc(role::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(roles.into_iter().map(Into::into).collect())
    }
}
