//! The guarded account and every operation exposed on it.
//!
//! Mutating operations follow the same shape: authorize the caller, take the
//! reentrancy lock when the operation hands control to an outside party,
//! validate, then mutate. Validation completes before the first write, except
//! in `spend`, which writes its accounting before the transfer and restores a
//! checkpoint if the transfer fails.

use tracing::{debug, info, warn};

use crate::account::auth::{authorize, Role};
use crate::account::recovery::{RecoveryStatus, VoteOutcome};
use crate::account::types::{Account, Amount, Identity, Timestamp};
use crate::env::CallContext;
use crate::error::{GuardError, StoreError};
use crate::events::Event;
use crate::reentrancy::ReentrancyGuard;

/// External handoff performed by [`Vault::spend`].
///
/// The vault lends itself to the transfer so a destination that reacts to
/// incoming value can call back into it synchronously. Guarded operations
/// refuse such calls; anything the callee does is rolled back if the transfer
/// then reports failure.
pub trait ValueTransfer {
    fn transfer(
        &mut self,
        vault: &mut Vault,
        destination: Identity,
        amount: Amount,
    ) -> Result<(), String>;
}

struct Checkpoint {
    account: Account,
    events: usize,
}

#[derive(Debug)]
pub struct Vault {
    account: Account,
    guard: ReentrancyGuard,
    events: Vec<Event>,
}

impl Vault {
    pub fn new(owner: Identity, daily_allowance: Amount) -> Result<Self, GuardError> {
        if owner.is_null() {
            return Err(GuardError::InvalidArgument("owner cannot be the null identity"));
        }
        info!("Vault created for owner {} (allowance {})", owner, daily_allowance);
        Ok(Self::wrap(Account::new(owner, daily_allowance)))
    }

    /// Resume from a persisted account record.
    pub fn from_account(account: Account) -> Result<Self, StoreError> {
        account.check_invariants().map_err(StoreError::Corrupt)?;
        Ok(Self::wrap(account))
    }

    fn wrap(account: Account) -> Self {
        Self {
            account,
            guard: ReentrancyGuard::new(),
            events: Vec::new(),
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Notifications not yet collected.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: Event) {
        info!(event = event.name(), "{:?}", event);
        self.events.push(event);
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            account: self.account.clone(),
            events: self.events.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.account = checkpoint.account;
        self.events.truncate(checkpoint.events);
    }

    // --- Guardian registry ---

    pub fn add_guardian(&mut self, ctx: &CallContext, guardian: Identity) -> Result<(), GuardError> {
        self.try_add_guardian(ctx, guardian)
            .inspect_err(|e| warn!("add_guardian {} rejected: {}", guardian, e))
    }

    fn try_add_guardian(&mut self, ctx: &CallContext, guardian: Identity) -> Result<(), GuardError> {
        authorize(&self.account, &ctx.caller, Role::Owner)?;
        if guardian.is_null() {
            return Err(GuardError::InvalidArgument("guardian cannot be the null identity"));
        }
        if guardian == self.account.owner {
            return Err(GuardError::InvalidArgument("owner cannot be a guardian"));
        }
        self.account.guardians.insert(guardian)?;
        self.emit(Event::GuardianAdded { guardian });
        Ok(())
    }

    pub fn remove_guardian(&mut self, ctx: &CallContext, guardian: Identity) -> Result<(), GuardError> {
        self.try_remove_guardian(ctx, guardian)
            .inspect_err(|e| warn!("remove_guardian {} rejected: {}", guardian, e))
    }

    fn try_remove_guardian(&mut self, ctx: &CallContext, guardian: Identity) -> Result<(), GuardError> {
        authorize(&self.account, &ctx.caller, Role::Owner)?;
        self.account.guardians.remove(&guardian)?;
        // A removed guardian must not count toward quorum
        if self.account.recovery.forget_voter(&guardian) {
            debug!("Withdrew recovery vote of removed guardian {}", guardian);
        }
        self.emit(Event::GuardianRemoved { guardian });
        Ok(())
    }

    // --- Spend limit ---

    pub fn set_allowance(&mut self, ctx: &CallContext, amount: Amount) -> Result<(), GuardError> {
        authorize(&self.account, &ctx.caller, Role::Owner)
            .inspect_err(|e| warn!("set_allowance rejected: {}", e))?;
        let previous = self.account.spend.set_allowance(amount);
        self.emit(Event::AllowanceChanged {
            previous,
            allowance: amount,
        });
        Ok(())
    }

    pub fn spend(
        &mut self,
        ctx: &CallContext,
        destination: Identity,
        amount: Amount,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<(), GuardError> {
        self.try_spend(ctx, destination, amount, transfer)
            .inspect_err(|e| warn!("spend of {} to {} rejected: {}", amount, destination, e))
    }

    fn try_spend(
        &mut self,
        ctx: &CallContext,
        destination: Identity,
        amount: Amount,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<(), GuardError> {
        authorize(&self.account, &ctx.caller, Role::Owner)?;
        let _lock = self.guard.enter()?;

        if destination.is_null() {
            return Err(GuardError::InvalidArgument("destination cannot be the null identity"));
        }
        if amount == 0 {
            return Err(GuardError::InvalidArgument("amount must be non-zero"));
        }

        let spend = &self.account.spend;
        if spend.last_spend_at() > 0 && spend.window_elapsed(ctx.now) {
            debug!("Spend window elapsed, counting from zero");
        }
        let window_total = spend.check(ctx.now, amount)?;

        let checkpoint = self.checkpoint();
        // Accounting lands before the handoff so a callee never sees stale totals
        self.account.spend.record(ctx.now, window_total);

        if let Err(reason) = transfer.transfer(self, destination, amount) {
            self.rollback(checkpoint);
            return Err(GuardError::TransferFailed(reason));
        }

        self.emit(Event::SpendExecuted {
            destination,
            amount,
            spent_today: window_total,
        });
        Ok(())
    }

    // --- Recovery ---

    pub fn approve_recovery(
        &mut self,
        ctx: &CallContext,
        candidate: Identity,
    ) -> Result<VoteOutcome, GuardError> {
        self.try_approve_recovery(ctx, candidate)
            .inspect_err(|e| warn!("approve_recovery for {} rejected: {}", candidate, e))
    }

    fn try_approve_recovery(
        &mut self,
        ctx: &CallContext,
        candidate: Identity,
    ) -> Result<VoteOutcome, GuardError> {
        authorize(&self.account, &ctx.caller, Role::Guardian)?;
        let _lock = self.guard.enter()?;

        if candidate.is_null() {
            return Err(GuardError::InvalidArgument("candidate cannot be the null identity"));
        }
        if candidate == self.account.owner {
            return Err(GuardError::InvalidArgument("candidate is already the owner"));
        }

        let outcome = self.account.recovery.cast_vote(ctx.now, ctx.caller, candidate)?;
        if let Some(stale) = outcome.expired {
            debug!("Recovery proposal for {} expired before this vote", stale);
        }
        if outcome.opened {
            self.emit(Event::RecoveryInitiated {
                candidate,
                initiator: ctx.caller,
                started_at: outcome.started_at,
            });
        }
        self.emit(Event::RecoveryVote {
            guardian: ctx.caller,
            candidate,
            votes: outcome.votes,
        });

        if outcome.quorum_reached {
            self.execute_recovery(candidate);
        }
        Ok(outcome)
    }

    fn execute_recovery(&mut self, new_owner: Identity) {
        // The owner may never sit in the guardian set
        if self.account.guardians.remove(&new_owner).is_ok() {
            self.emit(Event::GuardianRemoved { guardian: new_owner });
        }
        let previous_owner = std::mem::replace(&mut self.account.owner, new_owner);
        self.account.recovery.reset();
        self.emit(Event::OwnerRecovered {
            previous_owner,
            new_owner,
        });
    }

    pub fn cancel_recovery(&mut self, ctx: &CallContext) -> Result<(), GuardError> {
        self.try_cancel_recovery(ctx)
            .inspect_err(|e| warn!("cancel_recovery rejected: {}", e))
    }

    fn try_cancel_recovery(&mut self, ctx: &CallContext) -> Result<(), GuardError> {
        authorize(&self.account, &ctx.caller, Role::Owner)?;
        let cancelled = self.account.recovery.cancel(ctx.now)?;
        self.emit(Event::RecoveryCancelled {
            candidate: cancelled.candidate(),
        });
        Ok(())
    }

    // --- Queries ---

    pub fn owner(&self) -> Identity {
        self.account.owner
    }

    pub fn guardians(&self) -> &[Identity] {
        self.account.guardians.as_slice()
    }

    pub fn is_guardian(&self, id: &Identity) -> bool {
        self.account.guardians.contains(id)
    }

    pub fn guardian_count(&self) -> usize {
        self.account.guardians.len()
    }

    pub fn allowance(&self) -> Amount {
        self.account.spend.daily_allowance()
    }

    pub fn spent_today(&self, now: Timestamp) -> Amount {
        self.account.spend.spent_as_of(now)
    }

    pub fn remaining_allowance(&self, now: Timestamp) -> Amount {
        self.account.spend.remaining_as_of(now)
    }

    pub fn recovery_vote_count(&self, now: Timestamp) -> usize {
        self.account.recovery.vote_count_as_of(now)
    }

    pub fn proposed_new_owner(&self, now: Timestamp) -> Identity {
        self.account.recovery.candidate_as_of(now)
    }

    pub fn has_voted_for(&self, now: Timestamp, guardian: &Identity) -> bool {
        self.account.recovery.has_voted_as_of(now, guardian)
    }

    pub fn recovery_status(&self, now: Timestamp) -> RecoveryStatus {
        self.account.recovery.status(now)
    }
}
