//! Fund members.
//!
//! Every fund has exactly one `Owner` member, linked to the user who owns the
//! fund. Other members start unlinked (`linked_uid == 0`) and can later be
//! linked to a real user. `name` and `email` are a snapshot taken when the
//! member is created: later profile edits do not reach them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// `linked_uid` of a member not tied to any account holder.
pub const UNLINKED_UID: i64 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundRole {
    /// Can rename and delete the fund and manage its members.
    Owner,
    /// Read-only as far as fund management goes.
    Member,
}

impl FundRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }

    pub fn can_modify(self) -> bool {
        matches!(self, Self::Owner)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Owner => 0,
            Self::Member => 1,
        }
    }
}

impl TryFrom<&str> for FundRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(EngineError::InvalidFundRole(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMember {
    pub id: i64,
    pub fund_id: i64,
    pub name: String,
    pub email: String,
    pub role: FundRole,
    pub linked_uid: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FundMember {
    pub fn is_linked(&self) -> bool {
        self.linked_uid > UNLINKED_UID
    }
}

/// Listing order for members: the owner first, then by id.
pub fn member_order(a: &FundMember, b: &FundMember) -> Ordering {
    a.role
        .rank()
        .cmp(&b.role.rank())
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fund_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: i64,
    pub fund_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub linked_uid: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::funds::Entity",
        from = "Column::FundId",
        to = "super::funds::Column::FundId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Funds,
    #[sea_orm(has_many = "super::transaction_members::Entity")]
    TransactionMembers,
}

impl Related<super::funds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Funds.def()
    }
}

impl Related<super::transaction_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for FundMember {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.member_id,
            fund_id: value.fund_id,
            name: value.name,
            email: value.email,
            role: FundRole::try_from(value.role.as_str())?,
            linked_uid: value.linked_uid,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, role: FundRole, linked_uid: i64) -> FundMember {
        let now = Utc::now();
        FundMember {
            id,
            fund_id: 1,
            name: format!("member {id}"),
            email: String::new(),
            role,
            linked_uid,
            created_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn role_round_trips_through_storage_text() {
        for role in [FundRole::Owner, FundRole::Member] {
            assert_eq!(FundRole::try_from(role.as_str()).unwrap(), role);
        }
        assert_eq!(
            FundRole::try_from("admin"),
            Err(EngineError::InvalidFundRole("admin".to_string()))
        );
    }

    #[test]
    fn only_owner_can_modify() {
        assert!(FundRole::Owner.can_modify());
        assert!(!FundRole::Member.can_modify());
    }

    #[test]
    fn owner_sorts_first_regardless_of_id() {
        let mut members = vec![
            member(3, FundRole::Member, 0),
            member(9, FundRole::Owner, 500),
            member(1, FundRole::Member, 7),
        ];
        members.sort_by(member_order);
        let ids: Vec<i64> = members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![9, 1, 3]);
    }

    #[test]
    fn placeholder_members_are_not_linked() {
        assert!(!member(1, FundRole::Member, UNLINKED_UID).is_linked());
        assert!(member(2, FundRole::Member, 42).is_linked());
    }
}
