use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, FundRole, ResultEngine, fund_members, funds, records::transactions};

use super::Engine;

/// Role `uid` holds in `fund_id`, through the member row linked to it.
pub(super) async fn member_role<C: ConnectionTrait>(
    db: &C,
    uid: i64,
    fund_id: i64,
) -> ResultEngine<Option<FundRole>> {
    let row = fund_members::Entity::find()
        .filter(fund_members::Column::FundId.eq(fund_id))
        .filter(fund_members::Column::LinkedUid.eq(uid))
        .one(db)
        .await?;
    row.as_ref()
        .map(|m| FundRole::try_from(m.role.as_str()))
        .transpose()
}

/// `true` iff `uid` is linked to a member of `fund_id` (with a modifying role
/// when `modify` is set). Any failure denies.
pub(super) async fn has_access<C: ConnectionTrait>(
    db: &C,
    uid: i64,
    fund_id: i64,
    modify: bool,
) -> bool {
    if uid <= 0 || fund_id <= 0 {
        return false;
    }
    match member_role(db, uid, fund_id).await {
        Ok(Some(role)) => !modify || role.can_modify(),
        Ok(None) => false,
        Err(err) => {
            tracing::error!(
                "access check failed for user {} on fund {}: {}",
                uid,
                fund_id,
                err
            );
            false
        }
    }
}

pub(super) async fn require_access<C: ConnectionTrait>(
    db: &C,
    uid: i64,
    fund_id: i64,
) -> ResultEngine<()> {
    if !has_access(db, uid, fund_id, false).await {
        return Err(EngineError::FundAccessDenied);
    }
    Ok(())
}

pub(super) async fn require_modify<C: ConnectionTrait>(
    db: &C,
    uid: i64,
    fund_id: i64,
) -> ResultEngine<()> {
    if !has_access(db, uid, fund_id, true).await {
        return Err(EngineError::FundAccessDenied);
    }
    Ok(())
}

/// A fund that exists and is not soft-deleted.
pub(super) async fn require_live_fund<C: ConnectionTrait>(
    db: &C,
    fund_id: i64,
) -> ResultEngine<funds::Model> {
    funds::Entity::find_by_id(fund_id)
        .filter(funds::Column::Deleted.eq(false))
        .one(db)
        .await?
        .ok_or(EngineError::FundNotFound)
}

/// A transaction of `uid` that is not deleted.
pub(super) async fn require_owned_transaction<C: ConnectionTrait>(
    db: &C,
    uid: i64,
    transaction_id: i64,
) -> ResultEngine<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::Uid.eq(uid))
        .filter(transactions::Column::Deleted.eq(false))
        .one(db)
        .await?
        .ok_or(EngineError::TransactionNotFound)
}

/// A live transaction in a fund `uid` can read, whoever recorded it.
pub(super) async fn require_readable_transaction<C: ConnectionTrait>(
    db: &C,
    uid: i64,
    transaction_id: i64,
) -> ResultEngine<transactions::Model> {
    let transaction = transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::Deleted.eq(false))
        .one(db)
        .await?
        .ok_or(EngineError::TransactionNotFound)?;
    require_access(db, uid, transaction.fund_id).await?;
    Ok(transaction)
}

impl Engine {
    /// Whether `uid` may read `fund_id`: it is linked to one of its members.
    ///
    /// Never fails; storage errors are logged and deny access.
    pub async fn can_access(&self, uid: i64, fund_id: i64) -> bool {
        if uid <= 0 {
            return false;
        }
        has_access(self.shards.for_user(uid), uid, fund_id, false).await
    }

    /// Whether `uid` may manage `fund_id`: it is linked to its owner member.
    pub async fn can_modify(&self, uid: i64, fund_id: i64) -> bool {
        if uid <= 0 {
            return false;
        }
        has_access(self.shards.for_user(uid), uid, fund_id, true).await
    }
}
