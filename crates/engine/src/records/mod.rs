//! The six financial record types a fund scopes.
//!
//! They are owned elsewhere; the engine only relies on each row carrying the
//! owning user's `uid` and a `fund_id` (`0` = not scoped to any fund yet).

use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, QueryFilter, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};

pub mod accounts;
pub mod categories;
pub mod pictures;
pub mod tags;
pub mod templates;
pub mod transactions;

/// `fund_id` of a record that belongs to no fund.
pub const UNSCOPED_FUND_ID: i64 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Account,
    Transaction,
    Category,
    Tag,
    Template,
    Picture,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        Self::Account,
        Self::Transaction,
        Self::Category,
        Self::Tag,
        Self::Template,
        Self::Picture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Transaction => "transactions",
            Self::Category => "transaction categories",
            Self::Tag => "transaction tags",
            Self::Template => "transaction templates",
            Self::Picture => "transaction pictures",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Expands `$body` once per record kind with `$records` bound to that kind's
/// entity module.
macro_rules! with_record_entity {
    ($kind:expr, |$records:ident| $body:expr) => {
        match $kind {
            $crate::records::RecordKind::Account => {
                use $crate::records::accounts as $records;
                $body
            }
            $crate::records::RecordKind::Transaction => {
                use $crate::records::transactions as $records;
                $body
            }
            $crate::records::RecordKind::Category => {
                use $crate::records::categories as $records;
                $body
            }
            $crate::records::RecordKind::Tag => {
                use $crate::records::tags as $records;
                $body
            }
            $crate::records::RecordKind::Template => {
                use $crate::records::templates as $records;
                $body
            }
            $crate::records::RecordKind::Picture => {
                use $crate::records::pictures as $records;
                $body
            }
        }
    };
}

/// Sets `fund_id` on every `kind` row of `uid`. Returns the affected rows.
pub(crate) async fn assign_fund<C: ConnectionTrait>(
    db: &C,
    kind: RecordKind,
    uid: i64,
    fund_id: i64,
) -> Result<u64, DbErr> {
    with_record_entity!(kind, |records| {
        records::Entity::update_many()
            .col_expr(records::Column::FundId, Expr::value(fund_id))
            .filter(records::Column::Uid.eq(uid))
            .exec(db)
            .await
            .map(|res| res.rows_affected)
    })
}

/// Counts `kind` rows of `uid` whose `fund_id` is not `fund_id`.
pub(crate) async fn count_outside_fund<C: ConnectionTrait>(
    db: &C,
    kind: RecordKind,
    uid: i64,
    fund_id: i64,
) -> Result<u64, DbErr> {
    with_record_entity!(kind, |records| {
        records::Entity::find()
            .filter(records::Column::Uid.eq(uid))
            .filter(records::Column::FundId.ne(fund_id))
            .count(db)
            .await
    })
}
