//! Account record and the components that own its parts:
//! - guardian registry
//! - rolling daily spend limit
//! - guardian-quorum recovery
//! - caller authorization
//! - balance ledger used for outgoing transfers

pub mod types;
pub mod guardians;
pub mod spend;
pub mod recovery;
pub mod auth;
pub mod balance;

pub use types::{Account, Amount, Identity, Timestamp};
pub use guardians::{GuardianRegistry, MAX_GUARDIANS};
pub use spend::{SpendLimit, SPEND_WINDOW_SECS};
pub use recovery::{RecoveryCoordinator, RecoveryStatus, VoteOutcome, RECOVERY_EXPIRY_SECS, RECOVERY_QUORUM};
pub use auth::{authorize, Role};
pub use balance::{BalanceError, BalanceLedger};
