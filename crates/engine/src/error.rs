//! The module contains the errors the engine can return.
//!
//! Errors fall in a few families:
//!
//! - validation: [`UserIdInvalid`], [`FundIdInvalid`], [`MemberIdInvalid`],
//!   [`TransactionIdInvalid`], [`InvalidName`], [`InvalidCurrency`]. Checked
//!   before any storage access.
//! - not found: [`FundNotFound`], [`MemberNotFound`], [`TransactionNotFound`].
//! - authorization: [`FundAccessDenied`], the row exists but the caller lacks
//!   the required relationship.
//! - domain rules: [`CannotRemoveOwner`], [`InvalidFundRole`],
//!   [`MemberAlreadyLinked`], [`CannotLinkToSelf`].
//! - exhaustion: [`SystemBusy`], the id generator has nothing left right now.
//! - storage: [`Database`], propagated unchanged.
//!
//!  [`UserIdInvalid`]: EngineError::UserIdInvalid
//!  [`FundIdInvalid`]: EngineError::FundIdInvalid
//!  [`MemberIdInvalid`]: EngineError::MemberIdInvalid
//!  [`TransactionIdInvalid`]: EngineError::TransactionIdInvalid
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`FundNotFound`]: EngineError::FundNotFound
//!  [`MemberNotFound`]: EngineError::MemberNotFound
//!  [`TransactionNotFound`]: EngineError::TransactionNotFound
//!  [`FundAccessDenied`]: EngineError::FundAccessDenied
//!  [`CannotRemoveOwner`]: EngineError::CannotRemoveOwner
//!  [`InvalidFundRole`]: EngineError::InvalidFundRole
//!  [`MemberAlreadyLinked`]: EngineError::MemberAlreadyLinked
//!  [`CannotLinkToSelf`]: EngineError::CannotLinkToSelf
//!  [`SystemBusy`]: EngineError::SystemBusy
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("user id is invalid")]
    UserIdInvalid,
    #[error("fund id is invalid")]
    FundIdInvalid,
    #[error("member id is invalid")]
    MemberIdInvalid,
    #[error("transaction id is invalid")]
    TransactionIdInvalid,
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("fund not found")]
    FundNotFound,
    #[error("member not found")]
    MemberNotFound,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("fund access denied")]
    FundAccessDenied,
    #[error("cannot remove fund owner")]
    CannotRemoveOwner,
    #[error("invalid fund role: {0}")]
    InvalidFundRole(String),
    #[error("member already linked to user")]
    MemberAlreadyLinked,
    #[error("cannot link member to self")]
    CannotLinkToSelf,
    #[error("system is busy")]
    SystemBusy,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidFundRole(a), Self::InvalidFundRole(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            // Remaining variants carry no data.
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}
