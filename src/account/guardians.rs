//! Bounded guardian set

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::Identity;
use crate::error::GuardError;

/// Maximum number of guardians an account may delegate.
pub const MAX_GUARDIANS: usize = 5;

/// Guardian list plus its membership index.
///
/// Only the list is persisted; the index is rebuilt on load. Order carries no
/// meaning, removal swaps the last member into the vacated slot.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(try_from = "Vec<Identity>", into = "Vec<Identity>")]
pub struct GuardianRegistry {
    members: Vec<Identity>,
    index: HashSet<Identity>,
}

impl GuardianRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn as_slice(&self) -> &[Identity] {
        &self.members
    }

    /// Add a member. Null/owner screening is the caller's job.
    pub fn insert(&mut self, id: Identity) -> Result<(), GuardError> {
        if self.index.contains(&id) {
            return Err(GuardError::AlreadyExists);
        }
        if self.members.len() >= MAX_GUARDIANS {
            return Err(GuardError::CapacityExceeded);
        }
        self.members.push(id);
        self.index.insert(id);
        Ok(())
    }

    pub fn remove(&mut self, id: &Identity) -> Result<(), GuardError> {
        let position = self
            .members
            .iter()
            .position(|m| m == id)
            .ok_or(GuardError::NotFound)?;
        self.members.swap_remove(position);
        self.index.remove(id);
        Ok(())
    }

    /// The list and the index must describe the same set.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.members.len() > MAX_GUARDIANS {
            return Err(format!("{} guardians exceeds cap of {}", self.members.len(), MAX_GUARDIANS));
        }
        if self.index.len() != self.members.len() {
            return Err("guardian index size disagrees with list".to_string());
        }
        if let Some(missing) = self.members.iter().find(|m| !self.index.contains(*m)) {
            return Err(format!("guardian {} missing from index", missing));
        }
        Ok(())
    }
}

// Equality is set equality; list order is not significant.
impl PartialEq for GuardianRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl TryFrom<Vec<Identity>> for GuardianRegistry {
    type Error = String;

    fn try_from(members: Vec<Identity>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for id in members {
            if id.is_null() {
                return Err("null guardian in snapshot".to_string());
            }
            registry
                .insert(id)
                .map_err(|e| format!("invalid guardian {}: {}", id, e))?;
        }
        Ok(registry)
    }
}

impl From<GuardianRegistry> for Vec<Identity> {
    fn from(registry: GuardianRegistry) -> Self {
        registry.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u8) -> Identity {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Identity::from_bytes(bytes)
    }

    #[test]
    fn test_insert_and_remove() {
        let mut registry = GuardianRegistry::new();
        registry.insert(id(1)).unwrap();
        registry.insert(id(2)).unwrap();
        registry.insert(id(3)).unwrap();

        assert_eq!(registry.insert(id(2)), Err(GuardError::AlreadyExists));

        registry.remove(&id(1)).unwrap();
        assert!(!registry.contains(&id(1)));
        assert_eq!(registry.len(), 2);
        // Last member fills the vacated slot
        assert_eq!(registry.as_slice(), &[id(3), id(2)]);

        assert_eq!(registry.remove(&id(1)), Err(GuardError::NotFound));
        assert!(registry.check_consistency().is_ok());
    }

    #[test]
    fn test_capacity() {
        let mut registry = GuardianRegistry::new();
        for n in 1..=MAX_GUARDIANS as u8 {
            registry.insert(id(n)).unwrap();
        }
        assert_eq!(registry.insert(id(99)), Err(GuardError::CapacityExceeded));
        // Duplicate is reported before capacity
        assert_eq!(registry.insert(id(1)), Err(GuardError::AlreadyExists));
    }

    #[test]
    fn test_snapshot_rejects_duplicates_and_overflow() {
        assert!(GuardianRegistry::try_from(vec![id(1), id(1)]).is_err());
        assert!(GuardianRegistry::try_from((1..=6).map(id).collect::<Vec<_>>()).is_err());
        assert!(GuardianRegistry::try_from(vec![Identity::NULL]).is_err());

        let registry = GuardianRegistry::try_from(vec![id(4), id(5)]).unwrap();
        assert!(registry.contains(&id(4)));
        assert!(registry.check_consistency().is_ok());
    }

    proptest! {
        #[test]
        fn test_index_tracks_list(ops in prop::collection::vec((any::<bool>(), 1u8..9), 0..64)) {
            let mut registry = GuardianRegistry::new();
            for (add, n) in ops {
                let _ = if add { registry.insert(id(n)) } else { registry.remove(&id(n)) };
                prop_assert!(registry.len() <= MAX_GUARDIANS);
                prop_assert!(registry.check_consistency().is_ok());
                for m in 1u8..9 {
                    let listed = registry.as_slice().contains(&id(m));
                    prop_assert_eq!(registry.contains(&id(m)), listed);
                }
            }
        }
    }
}
