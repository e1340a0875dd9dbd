//! Fund multi-tenancy for a personal-finance backend.
//!
//! Financial records used to belong to a single user. A [`Fund`] groups them
//! instead: it has one owner and any number of members, some of them linked
//! to real users. [`Engine`] exposes the fund services plus the batch jobs
//! that move existing data into funds and back.

pub use batch::{
    MigrationProbe, MigrationStatus, RunState, UserOutcome, UserValidationFailure,
    ValidationIssue, ValidationResult,
};
pub use currency::CurrencyCode;
pub use error::EngineError;
pub use fund_members::{FundMember, FundRole, UNLINKED_UID};
pub use funds::{Fund, FundSummary, PERSONAL_FUND_NAME};
pub use ids::{IdGenerator, IdKind, SequenceIds, SnowflakeIds};
pub use ops::{Engine, EngineBuilder};
pub use records::{RecordKind, UNSCOPED_FUND_ID, transactions::Transaction};
pub use shards::Shards;
pub use users::UserProfile;

mod batch;
mod currency;
mod error;
mod ids;
mod ops;
mod shards;

pub mod fund_members;
pub mod funds;
pub mod records;
pub mod transaction_members;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
