use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue};

use crate::{
    Engine, FundRole, IdKind, PERSONAL_FUND_NAME, RecordKind, ResultEngine, UserProfile,
    fund_members, funds,
    ops::{require_uid, with_tx},
    records,
};

use super::{MigrationStatus, UserOutcome, owned_fund_count};

impl Engine {
    /// Gives every user without a fund a "Personal" fund and scopes all of
    /// their records to it.
    ///
    /// Safe to re-run: users that already own a live fund are skipped.
    /// Fails only if the user directory cannot be read.
    pub async fn migrate(&self) -> ResultEngine<MigrationStatus> {
        let users = self.all_users().await?;
        let status = self
            .sweep("migration", users, move |user| async move {
                let outcome = self.migrate_user(&user).await;
                (user, outcome)
            })
            .await;
        Ok(status)
    }

    async fn migrate_user(&self, user: &UserProfile) -> ResultEngine<UserOutcome> {
        let uid = user.uid;
        require_uid(uid)?;

        with_tx!(self, uid, |db_tx| {
            if owned_fund_count(&db_tx, uid).await? > 0 {
                Ok(UserOutcome::AlreadyMigrated)
            } else {
                let fund_id = self.next_id(IdKind::Fund)?;
                let member_id = self.next_id(IdKind::FundMember)?;
                let now = Utc::now();

                funds::ActiveModel {
                    fund_id: ActiveValue::Set(fund_id),
                    name: ActiveValue::Set(PERSONAL_FUND_NAME.to_string()),
                    owner_uid: ActiveValue::Set(uid),
                    default_currency: ActiveValue::Set(
                        user.default_currency.trim().to_uppercase(),
                    ),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    deleted: ActiveValue::Set(false),
                    deleted_at: ActiveValue::Set(None),
                }
                .insert(&db_tx)
                .await?;

                fund_members::ActiveModel {
                    member_id: ActiveValue::Set(member_id),
                    fund_id: ActiveValue::Set(fund_id),
                    name: ActiveValue::Set(user.nickname.clone()),
                    email: ActiveValue::Set(user.email.clone()),
                    role: ActiveValue::Set(FundRole::Owner.as_str().to_string()),
                    linked_uid: ActiveValue::Set(uid),
                    created_by: ActiveValue::Set(uid),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;

                for kind in RecordKind::ALL {
                    let rows = records::assign_fund(&db_tx, kind, uid, fund_id).await?;
                    tracing::debug!("user {}: scoped {} {} to fund {}", uid, rows, kind, fund_id);
                }

                Ok(UserOutcome::Migrated { fund_id })
            }
        })
    }
}
