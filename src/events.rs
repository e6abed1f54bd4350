//! Notifications emitted by successful vault operations

use serde::{Deserialize, Serialize};

use crate::account::types::{Amount, Identity, Timestamp};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum Event {
    GuardianAdded {
        guardian: Identity,
    },
    GuardianRemoved {
        guardian: Identity,
    },
    AllowanceChanged {
        previous: Amount,
        allowance: Amount,
    },
    SpendExecuted {
        destination: Identity,
        amount: Amount,
        spent_today: Amount,
    },
    RecoveryInitiated {
        candidate: Identity,
        initiator: Identity,
        started_at: Timestamp,
    },
    RecoveryVote {
        guardian: Identity,
        candidate: Identity,
        votes: usize,
    },
    OwnerRecovered {
        previous_owner: Identity,
        new_owner: Identity,
    },
    RecoveryCancelled {
        candidate: Identity,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::GuardianAdded { .. } => "GuardianAdded",
            Event::GuardianRemoved { .. } => "GuardianRemoved",
            Event::AllowanceChanged { .. } => "AllowanceChanged",
            Event::SpendExecuted { .. } => "SpendExecuted",
            Event::RecoveryInitiated { .. } => "RecoveryInitiated",
            Event::RecoveryVote { .. } => "RecoveryVote",
            Event::OwnerRecovered { .. } => "OwnerRecovered",
            Event::RecoveryCancelled { .. } => "RecoveryCancelled",
        }
    }
}
