//! One-time migration of single-owner data into funds.
//!
//! Every run walks the whole user directory in ascending uid order and
//! handles each user inside its own shard transaction, so one failing user
//! never undoes or blocks the others. Runs hold no state between calls:
//! whatever they report is rebuilt from storage.

use std::future::Future;

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Engine, ResultEngine, UserProfile, funds, users};

mod migrate;
mod rollback;
mod validate;

pub use validate::{UserValidationFailure, ValidationIssue, ValidationResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// What happened to one user during a migrate or rollback run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserOutcome {
    Migrated { fund_id: i64 },
    AlreadyMigrated,
    RolledBack,
}

/// Report of a migrate or rollback run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub state: RunState,
    pub total_users: u64,
    pub processed_users: u64,
    pub successful_users: u64,
    /// Users skipped because they already owned a fund. Counted as
    /// successful too.
    pub already_migrated_users: u64,
    pub failed_users: u64,
    pub failed_usernames: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl MigrationStatus {
    fn started(total_users: u64) -> Self {
        Self {
            state: RunState::InProgress,
            total_users,
            start_time: Some(Utc::now()),
            ..Self::default()
        }
    }

    fn record(&mut self, user: &UserProfile, outcome: &ResultEngine<UserOutcome>) {
        self.processed_users += 1;
        match outcome {
            Ok(UserOutcome::AlreadyMigrated) => {
                self.successful_users += 1;
                self.already_migrated_users += 1;
            }
            Ok(_) => self.successful_users += 1,
            Err(err) => {
                self.failed_users += 1;
                self.failed_usernames.push(user.username.clone());
                self.last_error = Some(format!("user {}: {}", user.username, err));
            }
        }
    }

    fn finish(mut self) -> Self {
        self.state = RunState::Completed;
        self.end_time = Some(Utc::now());
        self
    }

    /// No user failed.
    pub fn is_success(&self) -> bool {
        self.failed_users == 0
    }
}

/// How many directory users own at least one live fund.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationProbe {
    pub total_users: u64,
    pub migrated_users: u64,
}

impl MigrationProbe {
    /// Every user is migrated. Vacuously true for an empty directory.
    pub fn is_complete(&self) -> bool {
        self.migrated_users == self.total_users
    }
}

/// Live funds owned by `uid`.
pub(crate) async fn owned_fund_count<C: ConnectionTrait>(db: &C, uid: i64) -> ResultEngine<u64> {
    let count = funds::Entity::find()
        .filter(funds::Column::OwnerUid.eq(uid))
        .filter(funds::Column::Deleted.eq(false))
        .count(db)
        .await?;
    Ok(count)
}

impl Engine {
    /// Every live user in the directory, ascending by uid.
    pub async fn all_users(&self) -> ResultEngine<Vec<UserProfile>> {
        let rows = users::Entity::find()
            .filter(users::Column::Deleted.eq(false))
            .order_by_asc(users::Column::Uid)
            .all(&self.directory)
            .await?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }

    /// Counts migrated users with a full directory sweep.
    pub async fn migration_probe(&self) -> ResultEngine<MigrationProbe> {
        let users = self.all_users().await?;
        let mut probe = MigrationProbe {
            total_users: users.len() as u64,
            migrated_users: 0,
        };
        for user in &users {
            if owned_fund_count(self.shards.for_user(user.uid), user.uid).await? > 0 {
                probe.migrated_users += 1;
            }
        }
        Ok(probe)
    }

    /// `true` iff every user owns a fund.
    pub async fn check_status(&self) -> ResultEngine<bool> {
        Ok(self.migration_probe().await?.is_complete())
    }

    /// Runs `step` for each user in order and folds the outcomes into a
    /// status report.
    async fn sweep<F, Fut>(&self, run: &'static str, users: Vec<UserProfile>, step: F) -> MigrationStatus
    where
        F: FnMut(UserProfile) -> Fut,
        Fut: Future<Output = (UserProfile, ResultEngine<UserOutcome>)>,
    {
        let total = users.len() as u64;
        tracing::info!("{} started for {} users", run, total);

        let status = stream::iter(users)
            .then(step)
            .fold(
                MigrationStatus::started(total),
                |mut status, (user, outcome)| async move {
                    status.record(&user, &outcome);
                    match &outcome {
                        Ok(outcome) => tracing::info!(
                            "[{}/{}] {} user {} (uid {}): {:?}",
                            status.processed_users,
                            total,
                            run,
                            user.username,
                            user.uid,
                            outcome
                        ),
                        Err(err) => tracing::warn!(
                            "[{}/{}] {} failed for user {} (uid {}): {}",
                            status.processed_users,
                            total,
                            run,
                            user.username,
                            user.uid,
                            err
                        ),
                    }
                    status
                },
            )
            .await
            .finish();

        tracing::info!(
            "{} completed: {} succeeded, {} failed, {} already migrated",
            run,
            status.successful_users,
            status.failed_users,
            status.already_migrated_users
        );
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    fn user(username: &str) -> UserProfile {
        UserProfile {
            uid: 1,
            username: username.to_string(),
            nickname: String::new(),
            email: String::new(),
            default_currency: "USD".to_string(),
        }
    }

    #[test]
    fn status_counts_outcomes() {
        let mut status = MigrationStatus::started(3);
        status.record(&user("a"), &Ok(UserOutcome::Migrated { fund_id: 7 }));
        status.record(&user("b"), &Ok(UserOutcome::AlreadyMigrated));
        status.record(&user("c"), &Err(EngineError::SystemBusy));
        let status = status.finish();

        assert_eq!(status.state, RunState::Completed);
        assert_eq!(status.processed_users, 3);
        assert_eq!(status.successful_users, 2);
        assert_eq!(status.already_migrated_users, 1);
        assert_eq!(status.failed_usernames, vec!["c".to_string()]);
        assert!(status.last_error.as_deref().unwrap().starts_with("user c: "));
        assert!(!status.is_success());
        assert!(status.end_time.is_some());
    }

    #[test]
    fn status_serializes_camel_case() {
        let value = serde_json::to_value(MigrationStatus::default()).unwrap();
        assert_eq!(value["state"], "not_started");
        assert_eq!(value["alreadyMigratedUsers"], 0);
        assert!(value.get("lastError").is_none());

        let probe = serde_json::to_value(MigrationProbe {
            total_users: 2,
            migrated_users: 1,
        })
        .unwrap();
        assert_eq!(probe["migratedUsers"], 1);
    }
}
