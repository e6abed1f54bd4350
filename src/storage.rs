use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::debug;

use crate::account::{Account, BalanceLedger};
use crate::error::StoreError;

const ACCOUNT_KEY: &str = "account";
const LEDGER_KEY: &str = "ledger";

pub struct Storage {
    db: sled::Db,
}

impl Storage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!("Opening sled database at '{}'", path.display());
        let db = sled::open(path)?;
        Ok(Storage { db })
    }

    /// In-memory database removed on drop
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Storage { db })
    }

    // Generic Helper: Put
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let serialized = bincode::serialize(value)?;
        self.db.insert(key.as_bytes(), serialized)?;
        Ok(())
    }

    // Generic Helper: Get
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    // --- Specific Accessors ---

    /// Load the account record, rejecting snapshots that break its invariants.
    ///
    /// A record that fails to decode is reported as corrupt as well: the
    /// guardian list is validated while it is decoded.
    pub fn load_account(&self) -> Result<Option<Account>, StoreError> {
        let account: Account = match self.db.get(ACCOUNT_KEY.as_bytes())? {
            Some(data) => {
                bincode::deserialize(&data).map_err(|e| StoreError::Corrupt(e.to_string()))?
            }
            None => return Ok(None),
        };
        account.check_invariants().map_err(StoreError::Corrupt)?;
        Ok(Some(account))
    }

    pub fn load_ledger(&self) -> Result<BalanceLedger, StoreError> {
        Ok(self.get(LEDGER_KEY)?.unwrap_or_default())
    }

    /// Write account and ledger together.
    pub fn save_state(&self, account: &Account, ledger: &BalanceLedger) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        batch.insert(ACCOUNT_KEY.as_bytes(), bincode::serialize(account)?);
        batch.insert(LEDGER_KEY.as_bytes(), bincode::serialize(ledger)?);
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }
}
