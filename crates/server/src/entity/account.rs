//! Account entity - credentials and security state for password sign-in.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    #[sea_orm(unique)]
    pub normalized_username: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub security_stamp: String,
    pub lockout_enabled: bool,
    pub lockout_end: Option<OffsetDateTime>,
    pub access_failed_count: i32,
    pub two_factor_enabled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_role::Entity")]
    AccountRoles,
}

impl Related<super::account_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::account::Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            email_confirmed: model.email_confirmed,
            password_hash: model.password_hash,
            security_stamp: model.security_stamp,
            lockout_enabled: model.lockout_enabled,
            lockout_end: model.lockout_end,
            failed_attempt_count: model.access_failed_count,
            two_factor_enabled: model.two_factor_enabled,
        }
    }
}
