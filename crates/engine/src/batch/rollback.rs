use sea_orm::{Condition, QueryFilter, QuerySelect, prelude::*};

use crate::{
    Engine, RecordKind, ResultEngine, UserProfile, fund_members, funds,
    ops::{require_uid, with_tx},
    records::{self, UNSCOPED_FUND_ID},
    transaction_members,
};

use super::{MigrationStatus, UserOutcome};

impl Engine {
    /// Undoes [`Engine::migrate`]: unscopes every record and deletes each
    /// user's funds, their members and member links.
    ///
    /// Destructive for funds created after the migration as well.
    pub async fn rollback(&self) -> ResultEngine<MigrationStatus> {
        let users = self.all_users().await?;
        tracing::warn!("rolling back fund migration for {} users", users.len());
        let status = self
            .sweep("rollback", users, move |user| async move {
                let outcome = self.rollback_user(&user).await;
                (user, outcome)
            })
            .await;
        Ok(status)
    }

    async fn rollback_user(&self, user: &UserProfile) -> ResultEngine<UserOutcome> {
        let uid = user.uid;
        require_uid(uid)?;

        with_tx!(self, uid, |db_tx| {
            let fund_ids: Vec<i64> = funds::Entity::find()
                .select_only()
                .column(funds::Column::FundId)
                .filter(funds::Column::OwnerUid.eq(uid))
                .into_tuple()
                .all(&db_tx)
                .await?;

            let member_ids: Vec<i64> = fund_members::Entity::find()
                .select_only()
                .column(fund_members::Column::MemberId)
                .filter(
                    Condition::any()
                        .add(fund_members::Column::LinkedUid.eq(uid))
                        .add(fund_members::Column::FundId.is_in(fund_ids.iter().copied())),
                )
                .into_tuple()
                .all(&db_tx)
                .await?;

            for kind in RecordKind::ALL {
                records::assign_fund(&db_tx, kind, uid, UNSCOPED_FUND_ID).await?;
            }

            if !member_ids.is_empty() {
                transaction_members::Entity::delete_many()
                    .filter(transaction_members::Column::MemberId.is_in(member_ids.iter().copied()))
                    .exec(&db_tx)
                    .await?;
                fund_members::Entity::delete_many()
                    .filter(fund_members::Column::MemberId.is_in(member_ids.iter().copied()))
                    .exec(&db_tx)
                    .await?;
            }

            funds::Entity::delete_many()
                .filter(funds::Column::OwnerUid.eq(uid))
                .exec(&db_tx)
                .await?;

            Ok(UserOutcome::RolledBack)
        })
    }
}
