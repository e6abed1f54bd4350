//! Guardian-quorum recovery proposals
//!
//! At most one proposal is in flight. It expires three days after it was
//! opened; expiry is never scheduled, it is observed by the next call that
//! looks at the proposal. Read accessors take `now` and apply the same
//! projection as [`RecoveryCoordinator::cast_vote`], so a read and a write at
//! the same instant always agree on whether the proposal is alive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::types::{Identity, Timestamp};
use crate::error::GuardError;

/// Distinct guardian votes needed to execute a recovery. Absolute count,
/// independent of how many guardians are registered.
pub const RECOVERY_QUORUM: usize = 3;

/// Lifetime of a proposal in seconds.
pub const RECOVERY_EXPIRY_SECS: u64 = 3 * 86_400;

/// An open recovery proposal and the guardians who have voted for it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ActiveProposal {
    candidate: Identity,
    started_at: Timestamp,
    voters: BTreeSet<Identity>,
}

impl ActiveProposal {
    fn open(candidate: Identity, started_at: Timestamp) -> Self {
        Self {
            candidate,
            started_at,
            voters: BTreeSet::new(),
        }
    }

    pub fn candidate(&self) -> Identity {
        self.candidate
    }

    pub fn expires_at(&self) -> Timestamp {
        self.started_at.saturating_add(RECOVERY_EXPIRY_SECS)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at()
    }

    pub fn vote_count(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, guardian: &Identity) -> bool {
        self.voters.contains(guardian)
    }

    pub fn voters(&self) -> impl Iterator<Item = &Identity> {
        self.voters.iter()
    }
}

/// Read-only view of the coordinator after applying expiry.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecoveryStatus {
    Idle,
    Active {
        candidate: Identity,
        started_at: Timestamp,
        expires_at: Timestamp,
        votes: usize,
    },
}

/// What a successful vote did to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Candidate of a stale proposal discarded before this vote, if any
    pub expired: Option<Identity>,
    /// This vote opened a new proposal
    pub opened: bool,
    pub started_at: Timestamp,
    pub votes: usize,
    pub quorum_reached: bool,
}

/// Owner of the in-flight proposal. `None` is the canonical idle state, so a
/// cleared coordinator cannot carry stale candidate, timestamp or vote data.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecoveryCoordinator {
    proposal: Option<ActiveProposal>,
}

impl RecoveryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored proposal, without expiry applied.
    pub fn stored(&self) -> Option<&ActiveProposal> {
        self.proposal.as_ref()
    }

    /// Proposal still alive at `now`.
    pub fn live(&self, now: Timestamp) -> Option<&ActiveProposal> {
        self.proposal.as_ref().filter(|p| !p.is_expired(now))
    }

    pub fn status(&self, now: Timestamp) -> RecoveryStatus {
        match self.live(now) {
            Some(p) => RecoveryStatus::Active {
                candidate: p.candidate,
                started_at: p.started_at,
                expires_at: p.expires_at(),
                votes: p.vote_count(),
            },
            None => RecoveryStatus::Idle,
        }
    }

    /// Candidate of the live proposal, or the null identity.
    pub fn candidate_as_of(&self, now: Timestamp) -> Identity {
        self.live(now).map(|p| p.candidate).unwrap_or(Identity::NULL)
    }

    pub fn vote_count_as_of(&self, now: Timestamp) -> usize {
        self.live(now).map_or(0, |p| p.vote_count())
    }

    pub fn has_voted_as_of(&self, now: Timestamp, guardian: &Identity) -> bool {
        self.live(now).is_some_and(|p| p.has_voted(guardian))
    }

    /// Record `voter`'s approval of `candidate`, opening a proposal if none is
    /// alive. Validation happens before any mutation, so an error leaves the
    /// coordinator untouched. Reaching quorum does not reset the proposal; the
    /// caller executes the handover and then calls [`RecoveryCoordinator::reset`].
    pub fn cast_vote(
        &mut self,
        now: Timestamp,
        voter: Identity,
        candidate: Identity,
    ) -> Result<VoteOutcome, GuardError> {
        if let Some(pending) = self.live(now) {
            if pending.candidate != candidate {
                return Err(GuardError::Conflict {
                    pending: pending.candidate,
                    requested: candidate,
                });
            }
            if pending.has_voted(&voter) {
                return Err(GuardError::AlreadyVoted);
            }
        }

        let expired = match &self.proposal {
            Some(p) if p.is_expired(now) => Some(p.candidate),
            _ => None,
        };
        if expired.is_some() {
            self.proposal = None;
        }

        let opened = self.proposal.is_none();
        let proposal = self
            .proposal
            .get_or_insert_with(|| ActiveProposal::open(candidate, now));
        proposal.voters.insert(voter);
        let votes = proposal.vote_count();

        Ok(VoteOutcome {
            expired,
            opened,
            started_at: proposal.started_at,
            votes,
            quorum_reached: votes >= RECOVERY_QUORUM,
        })
    }

    /// Cancel the live proposal.
    pub fn cancel(&mut self, now: Timestamp) -> Result<ActiveProposal, GuardError> {
        if self.live(now).is_none() {
            return Err(GuardError::NotFound);
        }
        self.proposal.take().ok_or(GuardError::NotFound)
    }

    /// Back to idle, dropping every vote.
    pub fn reset(&mut self) -> Option<ActiveProposal> {
        self.proposal.take()
    }

    /// Drop a guardian's vote. Returns whether one was recorded.
    pub fn forget_voter(&mut self, guardian: &Identity) -> bool {
        self.proposal
            .as_mut()
            .is_some_and(|p| p.voters.remove(guardian))
    }
}
