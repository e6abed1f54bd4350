use thiserror::Error;

use crate::account::types::{Amount, Identity};

/// Reasons a vault operation is rejected.
///
/// Every failure is scoped to the single invocation that produced it: the
/// vault discards all of that call's state changes before returning one of
/// these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Caller is not authorized for this operation")]
    Unauthorized,
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Already exists")]
    AlreadyExists,
    #[error("Not found")]
    NotFound,
    #[error("Guardian set is full")]
    CapacityExceeded,
    #[error("Daily limit exceeded: requested {requested}, remaining {remaining}")]
    LimitExceeded { requested: Amount, remaining: Amount },
    #[error("Recovery already pending for {pending}, cannot vote for {requested}")]
    Conflict { pending: Identity, requested: Identity },
    #[error("Guardian already voted for this proposal")]
    AlreadyVoted,
    #[error("Reentrant call rejected")]
    Reentrancy,
    #[error("Transfer failed: {0}")]
    TransferFailed(String),
}

/// Persistence and snapshot failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
    #[error("No account has been initialized")]
    Uninitialized,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Error parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}
