use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*, sea_query::Expr};

use crate::{
    EngineError, FundMember, FundRole, IdKind, ResultEngine, UNLINKED_UID, fund_members,
    fund_members::member_order,
};

use super::{
    Engine,
    access::{require_access, require_live_fund, require_modify},
    normalize_email, normalize_required_name, require_fund_id, require_member_id, require_uid,
    transaction_members::delete_member_links, with_tx,
};

impl Engine {
    /// Lists the members of a fund the caller can access, owner first.
    pub async fn list_members(&self, uid: i64, fund_id: i64) -> ResultEngine<Vec<FundMember>> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        with_tx!(self, uid, |db_tx| {
            require_access(&db_tx, uid, fund_id).await?;
            let rows = fund_members::Entity::find()
                .filter(fund_members::Column::FundId.eq(fund_id))
                .all(&db_tx)
                .await?;
            let mut members = rows
                .into_iter()
                .map(FundMember::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            members.sort_by(member_order);
            Ok(members)
        })
    }

    pub async fn get_member(&self, uid: i64, member_id: i64) -> ResultEngine<FundMember> {
        require_uid(uid)?;
        require_member_id(member_id)?;
        with_tx!(self, uid, |db_tx| {
            let row = fund_members::Entity::find_by_id(member_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::MemberNotFound)?;
            require_access(&db_tx, uid, row.fund_id).await?;
            FundMember::try_from(row)
        })
    }

    /// Adds an unlinked member to a fund (owner-only).
    pub async fn add_member(
        &self,
        uid: i64,
        fund_id: i64,
        name: &str,
        email: Option<&str>,
    ) -> ResultEngine<FundMember> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        let name = normalize_required_name(name, "member")?;
        let email = normalize_email(email)?;

        with_tx!(self, uid, |db_tx| {
            require_modify(&db_tx, uid, fund_id).await?;
            require_live_fund(&db_tx, fund_id).await?;

            let member_id = self.next_id(IdKind::FundMember)?;
            let now = Utc::now();
            let row = fund_members::ActiveModel {
                member_id: ActiveValue::Set(member_id),
                fund_id: ActiveValue::Set(fund_id),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                role: ActiveValue::Set(FundRole::Member.as_str().to_string()),
                linked_uid: ActiveValue::Set(UNLINKED_UID),
                created_by: ActiveValue::Set(uid),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            FundMember::try_from(row)
        })
    }

    /// Removes a member from a fund (owner-only), along with its transaction
    /// links. The owner member cannot be removed.
    pub async fn remove_member(&self, uid: i64, fund_id: i64, member_id: i64) -> ResultEngine<()> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        require_member_id(member_id)?;

        with_tx!(self, uid, |db_tx| {
            require_modify(&db_tx, uid, fund_id).await?;
            let row = fund_members::Entity::find_by_id(member_id)
                .filter(fund_members::Column::FundId.eq(fund_id))
                .one(&db_tx)
                .await?
                .ok_or(EngineError::MemberNotFound)?;
            if FundRole::try_from(row.role.as_str())? == FundRole::Owner {
                return Err(EngineError::CannotRemoveOwner);
            }

            delete_member_links(&db_tx, member_id).await?;
            let res = fund_members::Entity::delete_many()
                .filter(fund_members::Column::MemberId.eq(member_id))
                .filter(fund_members::Column::FundId.eq(fund_id))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::MemberNotFound);
            }
            Ok(())
        })
    }

    /// Ties a placeholder member to a real user (owner-only).
    ///
    /// A user can back at most one member per fund, and the owner member
    /// stays linked to the owner.
    pub async fn link_member_to_user(
        &self,
        uid: i64,
        member_id: i64,
        linked_uid: i64,
    ) -> ResultEngine<FundMember> {
        require_uid(uid)?;
        require_member_id(member_id)?;
        require_uid(linked_uid)?;

        with_tx!(self, uid, |db_tx| {
            let row = fund_members::Entity::find_by_id(member_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::MemberNotFound)?;
            require_modify(&db_tx, uid, row.fund_id).await?;
            if linked_uid == uid {
                return Err(EngineError::CannotLinkToSelf);
            }
            if FundRole::try_from(row.role.as_str())? == FundRole::Owner {
                return Err(EngineError::CannotRemoveOwner);
            }

            let taken = fund_members::Entity::find()
                .filter(fund_members::Column::FundId.eq(row.fund_id))
                .filter(fund_members::Column::LinkedUid.eq(linked_uid))
                .filter(fund_members::Column::MemberId.ne(member_id))
                .one(&db_tx)
                .await?;
            if taken.is_some() {
                return Err(EngineError::MemberAlreadyLinked);
            }

            let res = fund_members::Entity::update_many()
                .col_expr(fund_members::Column::LinkedUid, Expr::value(linked_uid))
                .col_expr(fund_members::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(fund_members::Column::MemberId.eq(member_id))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::MemberNotFound);
            }

            let row = fund_members::Entity::find_by_id(member_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::MemberNotFound)?;
            tracing::info!(
                "member {} of fund {} linked to user {}",
                member_id,
                row.fund_id,
                linked_uid
            );
            FundMember::try_from(row)
        })
    }
}
