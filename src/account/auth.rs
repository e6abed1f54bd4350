//! Caller authorization for account operations

use super::types::{Account, Identity};
use crate::error::GuardError;

/// Role a caller must hold for an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Guardian,
}

impl Role {
    /// Check if `caller` holds this role on `account`
    pub fn permits(&self, account: &Account, caller: &Identity) -> bool {
        match self {
            Self::Owner => account.owner == *caller,
            Self::Guardian => account.guardians.contains(caller),
        }
    }
}

/// Gate run before any component logic of a mutating operation.
pub fn authorize(account: &Account, caller: &Identity, role: Role) -> Result<(), GuardError> {
    if caller.is_null() || !role.permits(account, caller) {
        return Err(GuardError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let owner = Identity::from_label("owner");
        let guardian = Identity::from_label("guardian");
        let stranger = Identity::from_label("stranger");

        let mut account = Account::new(owner, 0);
        account.guardians.insert(guardian).unwrap();

        assert!(authorize(&account, &owner, Role::Owner).is_ok());
        assert_eq!(authorize(&account, &guardian, Role::Owner), Err(GuardError::Unauthorized));

        assert!(authorize(&account, &guardian, Role::Guardian).is_ok());
        assert_eq!(authorize(&account, &owner, Role::Guardian), Err(GuardError::Unauthorized));

        assert_eq!(authorize(&account, &stranger, Role::Owner), Err(GuardError::Unauthorized));
        assert_eq!(authorize(&account, &stranger, Role::Guardian), Err(GuardError::Unauthorized));
        assert_eq!(authorize(&account, &Identity::NULL, Role::Guardian), Err(GuardError::Unauthorized));
    }
}
