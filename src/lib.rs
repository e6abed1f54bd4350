//! Self-custody safeguards for a single account: a bounded set of guardians
//! who can jointly recover ownership, and a rolling daily spend limit.

pub mod account;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod events;
pub mod reentrancy;
pub mod storage;
pub mod vault;

pub use account::{Account, Amount, Identity, Timestamp};
pub use env::CallContext;
pub use error::GuardError;
pub use events::Event;
pub use vault::{ValueTransfer, Vault};
