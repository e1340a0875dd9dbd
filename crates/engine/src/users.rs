//! Users table (directory connection).
//!
//! The engine only reads it: batch runs enumerate it and fund creation
//! snapshots the owner's nickname and email from it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub default_currency: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub default_currency: String,
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserProfile {
    fn from(value: Model) -> Self {
        Self {
            uid: value.uid,
            username: value.username,
            nickname: value.nickname,
            email: value.email,
            default_currency: value.default_currency,
        }
    }
}
