use core::fmt;

use futures::{StreamExt, stream};
use sea_orm::{PaginatorTrait, QueryFilter, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Engine, RecordKind, ResultEngine, UserProfile, fund_members, funds, records,
};

/// One inconsistency found for a migrated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// The user should own exactly one live fund.
    FundCount { found: u64 },
    /// Exactly one member of that fund should be linked to the user.
    MemberCount { found: u64 },
    /// Records of the user not scoped to that fund.
    MisscopedRecords { record: RecordKind, count: u64 },
    /// The checks themselves could not run.
    Storage { message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FundCount { found } => write!(f, "expected 1 fund, found {found}"),
            Self::MemberCount { found } => {
                write!(f, "expected 1 fund member, found {found}")
            }
            Self::MisscopedRecords { record, count } => {
                write!(f, "found {count} {record} with incorrect fund_id")
            }
            Self::Storage { message } => write!(f, "storage error: {message}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserValidationFailure {
    pub uid: i64,
    pub username: String,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for UserValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for user {}: ", self.username)?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Report of a validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub total_users: u64,
    pub validated_users: u64,
    pub successful_users: u64,
    pub failed_users: u64,
    pub is_valid: bool,
    pub validation_errors: Vec<String>,
    pub failed_usernames: Vec<String>,
    pub failures: Vec<UserValidationFailure>,
}

impl ValidationResult {
    fn record(&mut self, failure: Option<UserValidationFailure>) {
        self.validated_users += 1;
        match failure {
            None => self.successful_users += 1,
            Some(failure) => {
                self.failed_users += 1;
                self.is_valid = false;
                self.validation_errors.push(failure.to_string());
                self.failed_usernames.push(failure.username.clone());
                self.failures.push(failure);
            }
        }
    }
}

impl Engine {
    /// Checks every user's migrated state without writing anything.
    ///
    /// Per-user problems are collected, never raised. Fails only if the user
    /// directory cannot be read.
    pub async fn validate(&self) -> ResultEngine<ValidationResult> {
        let users = self.all_users().await?;
        let total = users.len() as u64;
        tracing::info!("validation started for {} users", total);

        let initial = ValidationResult {
            total_users: total,
            is_valid: true,
            ..ValidationResult::default()
        };
        let result = stream::iter(users)
            .then(move |user| async move {
                let issues = match self.user_issues(&user).await {
                    Ok(issues) => issues,
                    Err(err) => vec![ValidationIssue::Storage {
                        message: err.to_string(),
                    }],
                };
                (!issues.is_empty()).then(|| UserValidationFailure {
                    uid: user.uid,
                    username: user.username,
                    issues,
                })
            })
            .fold(initial, |mut result, failure| async move {
                if let Some(failure) = &failure {
                    tracing::warn!("{}", failure);
                }
                result.record(failure);
                result
            })
            .await;

        tracing::info!(
            "validation completed: {} passed, {} failed",
            result.successful_users,
            result.failed_users
        );
        Ok(result)
    }

    /// Everything wrong with one user's migrated state. Empty when valid.
    async fn user_issues(&self, user: &UserProfile) -> ResultEngine<Vec<ValidationIssue>> {
        let uid = user.uid;
        let db = self.shards.for_user(uid);

        let owned = funds::Entity::find()
            .filter(funds::Column::OwnerUid.eq(uid))
            .filter(funds::Column::Deleted.eq(false))
            .all(db)
            .await?;
        let [fund] = owned.as_slice() else {
            return Ok(vec![ValidationIssue::FundCount {
                found: owned.len() as u64,
            }]);
        };

        let mut issues = Vec::new();
        let members = fund_members::Entity::find()
            .filter(fund_members::Column::FundId.eq(fund.fund_id))
            .filter(fund_members::Column::LinkedUid.eq(uid))
            .count(db)
            .await?;
        if members != 1 {
            issues.push(ValidationIssue::MemberCount { found: members });
        }

        for kind in RecordKind::ALL {
            let count = records::count_outside_fund(db, kind, uid, fund.fund_id).await?;
            if count > 0 {
                issues.push(ValidationIssue::MisscopedRecords {
                    record: kind,
                    count,
                });
            }
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_lists_every_issue() {
        let failure = UserValidationFailure {
            uid: 7,
            username: "alice".to_string(),
            issues: vec![
                ValidationIssue::MemberCount { found: 0 },
                ValidationIssue::MisscopedRecords {
                    record: RecordKind::Transaction,
                    count: 3,
                },
            ],
        };
        assert_eq!(
            failure.to_string(),
            "validation failed for user alice: expected 1 fund member, found 0; \
             found 3 transactions with incorrect fund_id"
        );
    }

    #[test]
    fn a_failed_user_marks_the_run_invalid() {
        let mut result = ValidationResult {
            total_users: 2,
            is_valid: true,
            ..ValidationResult::default()
        };
        result.record(None);
        result.record(Some(UserValidationFailure {
            uid: 2,
            username: "bob".to_string(),
            issues: vec![ValidationIssue::FundCount { found: 0 }],
        }));
        assert_eq!(result.validated_users, 2);
        assert_eq!(result.successful_users, 1);
        assert_eq!(result.failed_users, 1);
        assert!(!result.is_valid);
        assert_eq!(result.failed_usernames, vec!["bob".to_string()]);
        assert_eq!(
            result.validation_errors,
            vec!["validation failed for user bob: expected 1 fund, found 0".to_string()]
        );
    }
}
