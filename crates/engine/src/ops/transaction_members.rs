use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait, prelude::*,
};

use crate::{
    EngineError, FundMember, ResultEngine, Transaction, fund_members, fund_members::member_order,
    records::transactions, transaction_members,
};

use super::{
    Engine,
    access::{
        require_access, require_modify, require_owned_transaction, require_readable_transaction,
    },
    require_fund_id, require_member_id, require_transaction_id, require_uid, with_tx,
};

/// Drops every transaction link of `member_id`. Returns the removed rows.
pub(crate) async fn delete_member_links<C: ConnectionTrait>(
    db: &C,
    member_id: i64,
) -> ResultEngine<u64> {
    let res = transaction_members::Entity::delete_many()
        .filter(transaction_members::Column::MemberId.eq(member_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

impl Engine {
    /// Replaces the members a transaction is attributed to.
    ///
    /// An empty `member_ids` attributes it to every current member of the
    /// transaction's fund. Returns the linked member ids, ascending.
    pub async fn link_members(
        &self,
        uid: i64,
        transaction_id: i64,
        member_ids: &[i64],
    ) -> ResultEngine<Vec<i64>> {
        require_uid(uid)?;
        require_transaction_id(transaction_id)?;
        for member_id in member_ids {
            require_member_id(*member_id)?;
        }

        with_tx!(self, uid, |db_tx| {
            let transaction = require_owned_transaction(&db_tx, uid, transaction_id).await?;
            require_access(&db_tx, uid, transaction.fund_id).await?;

            let fund_member_ids: BTreeSet<i64> = fund_members::Entity::find()
                .filter(fund_members::Column::FundId.eq(transaction.fund_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.member_id)
                .collect();

            let targets: BTreeSet<i64> = if member_ids.is_empty() {
                fund_member_ids
            } else {
                let requested: BTreeSet<i64> = member_ids.iter().copied().collect();
                if !requested.is_subset(&fund_member_ids) {
                    return Err(EngineError::MemberNotFound);
                }
                requested
            };

            transaction_members::Entity::delete_many()
                .filter(transaction_members::Column::TransactionId.eq(transaction_id))
                .exec(&db_tx)
                .await?;

            if !targets.is_empty() {
                let now = Utc::now();
                let rows = targets
                    .iter()
                    .map(|member_id| transaction_members::ActiveModel {
                        transaction_id: ActiveValue::Set(transaction_id),
                        member_id: ActiveValue::Set(*member_id),
                        created_at: ActiveValue::Set(now),
                    });
                transaction_members::Entity::insert_many(rows)
                    .exec(&db_tx)
                    .await?;
            }

            Ok(targets.into_iter().collect())
        })
    }

    /// Removes every member link of a transaction owned by `uid`.
    pub async fn unlink_members(&self, uid: i64, transaction_id: i64) -> ResultEngine<()> {
        require_uid(uid)?;
        require_transaction_id(transaction_id)?;
        with_tx!(self, uid, |db_tx| {
            require_owned_transaction(&db_tx, uid, transaction_id).await?;
            transaction_members::Entity::delete_many()
                .filter(transaction_members::Column::TransactionId.eq(transaction_id))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn is_linked(
        &self,
        uid: i64,
        transaction_id: i64,
        member_id: i64,
    ) -> ResultEngine<bool> {
        require_uid(uid)?;
        require_transaction_id(transaction_id)?;
        require_member_id(member_id)?;
        with_tx!(self, uid, |db_tx| {
            require_readable_transaction(&db_tx, uid, transaction_id).await?;
            let found = transaction_members::Entity::find_by_id((transaction_id, member_id))
                .one(&db_tx)
                .await?;
            Ok(found.is_some())
        })
    }

    /// Members a transaction is attributed to, owner first.
    pub async fn members_of(&self, uid: i64, transaction_id: i64) -> ResultEngine<Vec<FundMember>> {
        require_uid(uid)?;
        require_transaction_id(transaction_id)?;
        with_tx!(self, uid, |db_tx| {
            require_readable_transaction(&db_tx, uid, transaction_id).await?;
            let linked = transaction_members::Entity::find()
                .select_only()
                .column(transaction_members::Column::MemberId)
                .filter(transaction_members::Column::TransactionId.eq(transaction_id))
                .into_query();
            let rows = fund_members::Entity::find()
                .filter(fund_members::Column::MemberId.in_subquery(linked))
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

    /// Ids of the members a transaction is attributed to, ascending.
    pub async fn member_ids_of(&self, uid: i64, transaction_id: i64) -> ResultEngine<Vec<i64>> {
        require_uid(uid)?;
        require_transaction_id(transaction_id)?;
        with_tx!(self, uid, |db_tx| {
            require_readable_transaction(&db_tx, uid, transaction_id).await?;
            let rows = transaction_members::Entity::find()
                .filter(transaction_members::Column::TransactionId.eq(transaction_id))
                .order_by_asc(transaction_members::Column::MemberId)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(|row| row.member_id).collect())
        })
    }

    /// The caller's live transactions in `fund_id` attributed to
    /// `member_id`, newest first.
    pub async fn transactions_of(
        &self,
        uid: i64,
        fund_id: i64,
        member_id: i64,
    ) -> ResultEngine<Vec<Transaction>> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        require_member_id(member_id)?;
        with_tx!(self, uid, |db_tx| {
            require_access(&db_tx, uid, fund_id).await?;
            let rows = member_transactions(uid, fund_id, member_id)
                .order_by_desc(transactions::Column::TransactionTime)
                .order_by_desc(transactions::Column::TransactionId)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Transaction::from).collect())
        })
    }

    /// Number of transactions [`Engine::transactions_of`] would return.
    pub async fn transaction_count_of(
        &self,
        uid: i64,
        fund_id: i64,
        member_id: i64,
    ) -> ResultEngine<u64> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        require_member_id(member_id)?;
        with_tx!(self, uid, |db_tx| {
            require_access(&db_tx, uid, fund_id).await?;
            let count = member_transactions(uid, fund_id, member_id)
                .count(&db_tx)
                .await?;
            Ok(count)
        })
    }

    /// Drops every transaction link of a member.
    ///
    /// While the member still exists the caller must be able to modify its
    /// fund. Links left behind by an already removed member are only cleared
    /// from the caller's own transactions.
    pub async fn delete_by_member(&self, uid: i64, member_id: i64) -> ResultEngine<u64> {
        require_uid(uid)?;
        require_member_id(member_id)?;
        with_tx!(self, uid, |db_tx| {
            let member = fund_members::Entity::find_by_id(member_id)
                .one(&db_tx)
                .await?;
            if let Some(member) = member {
                require_modify(&db_tx, uid, member.fund_id).await?;
                delete_member_links(&db_tx, member_id).await
            } else {
                let own = transactions::Entity::find()
                    .select_only()
                    .column(transactions::Column::TransactionId)
                    .filter(transactions::Column::Uid.eq(uid))
                    .into_query();
                let res = transaction_members::Entity::delete_many()
                    .filter(transaction_members::Column::MemberId.eq(member_id))
                    .filter(transaction_members::Column::TransactionId.in_subquery(own))
                    .exec(&db_tx)
                    .await?;
                Ok(res.rows_affected)
            }
        })
    }
}

fn member_transactions(uid: i64, fund_id: i64, member_id: i64) -> Select<transactions::Entity> {
    let linked = transaction_members::Entity::find()
        .select_only()
        .column(transaction_members::Column::TransactionId)
        .filter(transaction_members::Column::MemberId.eq(member_id))
        .into_query();
    transactions::Entity::find()
        .filter(transactions::Column::TransactionId.in_subquery(linked))
        .filter(transactions::Column::FundId.eq(fund_id))
        .filter(transactions::Column::Uid.eq(uid))
        .filter(transactions::Column::Deleted.eq(false))
}
