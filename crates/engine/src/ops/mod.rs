use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{EngineError, IdGenerator, IdKind, ResultEngine, Shards, SnowflakeIds};

mod access;
mod funds;
mod members;
mod transaction_members;

/// Run a block inside a transaction on `uid`'s shard, committing on success.
/// On error the transaction is dropped, which rolls it back.
macro_rules! with_tx {
    ($self:expr, $uid:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin($self.shards.for_user($uid)).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const MAX_NAME_CHARS: usize = 64;
const MAX_EMAIL_CHARS: usize = 100;

/// Fund service: lifecycle, membership, transaction attribution and the
/// batch migration engines.
///
/// Built once at startup and shared by reference; it holds no state besides
/// its collaborators.
#[derive(Debug)]
pub struct Engine {
    pub(crate) directory: DatabaseConnection,
    pub(crate) shards: Shards,
    ids: Arc<dyn IdGenerator>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn next_id(&self, kind: IdKind) -> ResultEngine<i64> {
        self.ids
            .generate(kind)
            .filter(|id| *id > 0)
            .ok_or(EngineError::SystemBusy)
    }
}

pub(crate) fn require_uid(uid: i64) -> ResultEngine<()> {
    if uid <= 0 {
        return Err(EngineError::UserIdInvalid);
    }
    Ok(())
}

pub(crate) fn require_fund_id(fund_id: i64) -> ResultEngine<()> {
    if fund_id <= 0 {
        return Err(EngineError::FundIdInvalid);
    }
    Ok(())
}

pub(crate) fn require_member_id(member_id: i64) -> ResultEngine<()> {
    if member_id <= 0 {
        return Err(EngineError::MemberIdInvalid);
    }
    Ok(())
}

pub(crate) fn require_transaction_id(transaction_id: i64) -> ResultEngine<()> {
    if transaction_id <= 0 {
        return Err(EngineError::TransactionIdInvalid);
    }
    Ok(())
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(EngineError::InvalidName(format!(
            "{label} name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(value: Option<&str>) -> ResultEngine<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(EngineError::InvalidName(format!(
            "email must be at most {MAX_EMAIL_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    directory: Option<DatabaseConnection>,
    shards: Option<Shards>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl EngineBuilder {
    /// Use one database for the user directory and every shard.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.shards = Some(Shards::single(db.clone()));
        self.directory = Some(db);
        self
    }

    /// Database holding the `users` table.
    pub fn directory(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.directory = Some(db);
        self
    }

    pub fn shards(mut self, shards: Shards) -> EngineBuilder {
        self.shards = Some(shards);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> EngineBuilder {
        self.ids = Some(ids);
        self
    }

    /// Construct `Engine`
    ///
    /// Without explicit shards the directory database is the only shard;
    /// without an id generator a node-0 [`SnowflakeIds`] is used.
    pub async fn build(self) -> ResultEngine<Engine> {
        let directory = self.directory.unwrap_or_default();
        let shards = self
            .shards
            .unwrap_or_else(|| Shards::single(directory.clone()));
        let ids = self.ids.unwrap_or_else(|| Arc::new(SnowflakeIds::new(0)));
        Ok(Engine {
            directory,
            shards,
            ids,
        })
    }
}
