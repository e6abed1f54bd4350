//! Core value types and the account record

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use super::guardians::GuardianRegistry;
use super::recovery::RecoveryCoordinator;
use super::spend::SpendLimit;

/// Monetary amount in the account's smallest unit
pub type Amount = u64;

/// Seconds since the Unix epoch
pub type Timestamp = u64;

/// Opaque 20-byte party identifier. All zeroes is the null identity.
///
/// Human-readable formats carry the `0x`-prefixed hex form, binary formats the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity([u8; 20]);

impl Identity {
    pub const NULL: Identity = Identity([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic identity for a human-readable label (first 20 bytes of SHA-256)
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

impl FromStr for Identity {
    type Err = String;

    /// Accepts 40 hex digits (optionally `0x`-prefixed) or `@label`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(label) = s.strip_prefix('@') {
            if label.is_empty() {
                return Err("Empty identity label".to_string());
            }
            return Ok(Self::from_label(label));
        }
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| format!("Invalid identity hex: {}", e))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("Identity must be 20 bytes, got {}", v.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; 20]>::deserialize(deserializer).map(Self)
        }
    }
}

/// The single account guarded by a vault.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    pub owner: Identity,
    pub guardians: GuardianRegistry,
    pub spend: SpendLimit,
    pub recovery: RecoveryCoordinator,
}

impl Account {
    pub fn new(owner: Identity, daily_allowance: Amount) -> Self {
        Self {
            owner,
            guardians: GuardianRegistry::new(),
            spend: SpendLimit::new(daily_allowance),
            recovery: RecoveryCoordinator::new(),
        }
    }

    /// Verify the structural invariants that must hold between operations.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.owner.is_null() {
            return Err("owner is the null identity".to_string());
        }
        self.guardians.check_consistency()?;
        if self.guardians.contains(&self.owner) {
            return Err(format!("owner {} is also a guardian", self.owner));
        }
        if let Some(proposal) = self.recovery.stored() {
            if let Some(stray) = proposal.voters().find(|v| !self.guardians.contains(v)) {
                return Err(format!("vote recorded for non-guardian {}", stray));
            }
            if proposal.vote_count() > self.guardians.len() {
                return Err("vote count exceeds guardian count".to_string());
            }
            if proposal.candidate().is_null() {
                return Err("active proposal has a null candidate".to_string());
            }
        }
        Ok(())
    }
}
