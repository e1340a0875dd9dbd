//! A `Fund` is a named financial scope. It owns the user's accounts,
//! transactions, categories, tags, templates and pictures, and is shared with
//! its members.
//!
//! Funds are never hard-deleted: deleting one only hides it from listings,
//! members and financial records stay addressable by fund id.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::FundRole;

/// Name given to the fund every user receives when migrated.
pub const PERSONAL_FUND_NAME: &str = "Personal";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub id: i64,
    pub name: String,
    /// The user who created the fund. Informational once ownership lives in
    /// the owner member row.
    pub owner_uid: i64,
    pub default_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A fund as seen by one caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSummary {
    pub fund: Fund,
    pub role: FundRole,
    pub member_count: u64,
}

/// Listing order for funds: oldest first, ties broken by id.
pub fn fund_order(a: &Fund, b: &Fund) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "funds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub fund_id: i64,
    pub name: String,
    pub owner_uid: i64,
    pub default_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fund_members::Entity")]
    FundMembers,
}

impl Related<super::fund_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Fund {
    fn from(value: Model) -> Self {
        Self {
            id: value.fund_id,
            name: value.name,
            owner_uid: value.owner_uid,
            default_currency: value.default_currency,
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted: value.deleted,
            deleted_at: value.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fund(id: i64, created_secs: i64) -> Fund {
        let at = Utc.timestamp_opt(created_secs, 0).unwrap();
        Fund {
            id,
            name: format!("fund {id}"),
            owner_uid: 1,
            default_currency: "EUR".to_string(),
            created_at: at,
            updated_at: at,
            deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn funds_sort_by_creation_then_id() {
        let mut funds = vec![fund(30, 200), fund(20, 100), fund(10, 200)];
        funds.sort_by(fund_order);
        let ids: Vec<i64> = funds.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![20, 10, 30]);
    }
}
