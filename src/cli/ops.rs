use serde::Serialize;

use super::{CliError, Commands};
use crate::account::{Amount, BalanceLedger, Identity, RecoveryStatus};
use crate::config::VaultConfig;
use crate::env::Clock;
use crate::error::StoreError;
use crate::storage::Storage;
use crate::vault::Vault;

#[derive(Serialize)]
struct StatusReport<'a> {
    owner: Identity,
    guardians: &'a [Identity],
    daily_allowance: Amount,
    spent_today: Amount,
    remaining_today: Amount,
    treasury: Amount,
    recovery: RecoveryStatus,
}

fn open_vault(storage: &Storage) -> Result<(Vault, BalanceLedger), CliError> {
    let account = storage.load_account()?.ok_or(StoreError::Uninitialized)?;
    Ok((Vault::from_account(account)?, storage.load_ledger()?))
}

/// Persist the outcome of a successful operation and print its notifications.
fn commit(storage: &Storage, mut vault: Vault, ledger: &BalanceLedger) -> Result<(), CliError> {
    storage.save_state(vault.account(), ledger)?;
    for event in vault.take_events() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

pub fn handle_command(
    cmd: Commands,
    storage: &Storage,
    clock: &dyn Clock,
    config: &VaultConfig,
) -> Result<(), CliError> {
    let now = clock.now();

    match cmd {
        Commands::Init { owner, allowance } => {
            if storage.load_account()?.is_some() {
                return Err(CliError::AlreadyInitialized);
            }
            let vault = Vault::new(owner, allowance.unwrap_or(config.account.initial_allowance))?;
            storage.save_state(vault.account(), &storage.load_ledger()?)?;
            println!("Vault initialized. Owner: {}", owner);
        }
        Commands::Deposit { amount } => {
            // Funding the treasury does not touch the account record
            let (vault, mut ledger) = open_vault(storage)?;
            let treasury = ledger.deposit(amount)?;
            commit(storage, vault, &ledger)?;
            println!("Treasury balance: {}", treasury);
        }
        Commands::AddGuardian { caller, guardian } => {
            let (mut vault, ledger) = open_vault(storage)?;
            vault.add_guardian(&clock.context(caller), guardian)?;
            commit(storage, vault, &ledger)?;
        }
        Commands::RemoveGuardian { caller, guardian } => {
            let (mut vault, ledger) = open_vault(storage)?;
            vault.remove_guardian(&clock.context(caller), guardian)?;
            commit(storage, vault, &ledger)?;
        }
        Commands::SetAllowance { caller, amount } => {
            let (mut vault, ledger) = open_vault(storage)?;
            vault.set_allowance(&clock.context(caller), amount)?;
            commit(storage, vault, &ledger)?;
        }
        Commands::Spend { caller, to, amount } => {
            let (mut vault, mut ledger) = open_vault(storage)?;
            vault.spend(&clock.context(caller), to, amount, &mut ledger)?;
            commit(storage, vault, &ledger)?;
        }
        Commands::Approve { caller, candidate } => {
            let (mut vault, ledger) = open_vault(storage)?;
            vault.approve_recovery(&clock.context(caller), candidate)?;
            commit(storage, vault, &ledger)?;
        }
        Commands::Cancel { caller } => {
            let (mut vault, ledger) = open_vault(storage)?;
            vault.cancel_recovery(&clock.context(caller))?;
            commit(storage, vault, &ledger)?;
        }
        Commands::Refuse { account, undo } => {
            let (vault, mut ledger) = open_vault(storage)?;
            if undo {
                ledger.accept_incoming(&account);
            } else {
                ledger.refuse_incoming(account);
            }
            commit(storage, vault, &ledger)?;
        }
        Commands::Status => {
            let (vault, ledger) = open_vault(storage)?;
            let report = StatusReport {
                owner: vault.owner(),
                guardians: vault.guardians(),
                daily_allowance: vault.allowance(),
                spent_today: vault.spent_today(now),
                remaining_today: vault.remaining_allowance(now),
                treasury: ledger.treasury(),
                recovery: vault.recovery_status(now),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::HasVoted { guardian } => {
            let (vault, _) = open_vault(storage)?;
            println!("{}", vault.has_voted_for(now, &guardian));
        }
        Commands::Balance { of } => {
            let (_, ledger) = open_vault(storage)?;
            let balance = match of {
                Some(id) => ledger.balance_of(&id),
                None => ledger.treasury(),
            };
            println!("{}", balance);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ManualClock;
    use crate::error::GuardError;

    const T0: u64 = 1_700_000_000;

    fn id(label: &str) -> Identity {
        Identity::from_label(label)
    }

    fn run(storage: &Storage, clock: &ManualClock, cmd: Commands) -> Result<(), CliError> {
        handle_command(cmd, storage, clock, &VaultConfig::default())
    }

    #[test]
    fn test_state_survives_between_commands() {
        let storage = Storage::temporary().unwrap();
        let clock = ManualClock::at(T0);

        assert!(matches!(
            run(&storage, &clock, Commands::Status),
            Err(CliError::Store(StoreError::Uninitialized))
        ));

        run(&storage, &clock, Commands::Init { owner: id("owner"), allowance: Some(1000) }).unwrap();
        assert!(matches!(
            run(&storage, &clock, Commands::Init { owner: id("owner"), allowance: None }),
            Err(CliError::AlreadyInitialized)
        ));

        run(&storage, &clock, Commands::Deposit { amount: 5000 }).unwrap();
        run(&storage, &clock, Commands::Spend { caller: id("owner"), to: id("shop"), amount: 600 }).unwrap();
        assert!(matches!(
            run(&storage, &clock, Commands::Spend { caller: id("owner"), to: id("shop"), amount: 500 }),
            Err(CliError::Rejected(GuardError::LimitExceeded { .. }))
        ));

        let (vault, ledger) = open_vault(&storage).unwrap();
        assert_eq!(vault.spent_today(T0), 600);
        assert_eq!(ledger.treasury(), 4400);
        assert_eq!(ledger.balance_of(&id("shop")), 600);
    }

    #[test]
    fn test_recovery_across_invocations() {
        let storage = Storage::temporary().unwrap();
        let clock = ManualClock::at(T0);
        run(&storage, &clock, Commands::Init { owner: id("owner"), allowance: None }).unwrap();
        for g in ["g1", "g2", "g3"] {
            run(&storage, &clock, Commands::AddGuardian { caller: id("owner"), guardian: id(g) }).unwrap();
        }
        for g in ["g1", "g2"] {
            run(&storage, &clock, Commands::Approve { caller: id(g), candidate: id("x") }).unwrap();
        }
        clock.advance(60);
        run(&storage, &clock, Commands::Approve { caller: id("g3"), candidate: id("x") }).unwrap();

        let (vault, _) = open_vault(&storage).unwrap();
        assert_eq!(vault.owner(), id("x"));
        assert_eq!(vault.recovery_status(clock.now()), RecoveryStatus::Idle);
    }

    #[test]
    fn test_rejected_command_is_not_persisted() {
        let storage = Storage::temporary().unwrap();
        let clock = ManualClock::at(T0);
        run(&storage, &clock, Commands::Init { owner: id("owner"), allowance: Some(100) }).unwrap();
        run(&storage, &clock, Commands::Refuse { account: id("wall"), undo: false }).unwrap();
        run(&storage, &clock, Commands::Deposit { amount: 100 }).unwrap();

        assert!(matches!(
            run(&storage, &clock, Commands::Spend { caller: id("owner"), to: id("wall"), amount: 10 }),
            Err(CliError::Rejected(GuardError::TransferFailed(_)))
        ));
        let (vault, ledger) = open_vault(&storage).unwrap();
        assert_eq!(vault.spent_today(T0), 0);
        assert_eq!(ledger.treasury(), 100);
    }
}
