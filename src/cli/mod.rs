pub mod ops;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::account::{Amount, BalanceError, Identity, Timestamp};
use crate::error::{ConfigError, GuardError, StoreError};

#[derive(Parser)]
#[command(name = "guardian-vault")]
#[command(about = "Guardian recovery and daily spend limits for a single account", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "guardian-vault.toml")]
    pub config: String,
    /// Evaluate the command at this Unix time instead of the wall clock
    #[arg(long)]
    pub at: Option<Timestamp>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Identities are 40 hex digits (optionally `0x`-prefixed) or `@label`.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the guarded account
    Init {
        #[arg(long)]
        owner: Identity,
        #[arg(long)]
        allowance: Option<Amount>,
    },
    /// Fund the account's treasury
    Deposit {
        #[arg(long)]
        amount: Amount,
    },
    AddGuardian {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        guardian: Identity,
    },
    RemoveGuardian {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        guardian: Identity,
    },
    SetAllowance {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        amount: Amount,
    },
    /// Send value out of the treasury, subject to the daily limit
    Spend {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        to: Identity,
        #[arg(long)]
        amount: Amount,
    },
    /// Vote to hand the account to a new owner
    Approve {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        candidate: Identity,
    },
    /// Cancel the pending recovery proposal
    Cancel {
        #[arg(long)]
        caller: Identity,
    },
    /// Mark a destination as refusing (or accepting again) incoming transfers
    Refuse {
        #[arg(long)]
        account: Identity,
        #[arg(long)]
        undo: bool,
    },
    Status,
    HasVoted {
        #[arg(long)]
        guardian: Identity,
    },
    /// Ledger balance of an identity, or the treasury when omitted
    Balance {
        #[arg(long)]
        of: Option<Identity>,
    },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Rejected: {0}")]
    Rejected(#[from] GuardError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] BalanceError),
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
    #[error("An account already exists in this database")]
    AlreadyInitialized,
}
