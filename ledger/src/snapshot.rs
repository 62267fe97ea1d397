//! Ledger snapshots: capture every balance at a point in time.
//!
//! The snapshot hash is computed deterministically from the balances, the
//! total supply and the escrow so a restored ledger can be checked against
//! the one that was saved.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::store::LedgerStore;
use nmr_types::{Address, NmrAmount, Timestamp};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A ledger snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of the balance data.
    pub hash: [u8; 32],
    /// When the snapshot was taken. Not covered by the hash.
    pub created_at: Timestamp,
    /// Non-zero balances in address order.
    pub accounts: Vec<(Address, NmrAmount)>,
    pub total_supply: NmrAmount,
    pub escrowed: NmrAmount,
    /// Snapshot version for compatibility.
    pub version: u32,
}

impl LedgerSnapshot {
    /// Capture the current state of `ledger`.
    pub fn create(ledger: &LedgerStore, created_at: Timestamp) -> Self {
        let mut snap = Self {
            hash: [0u8; 32],
            created_at,
            accounts: ledger.accounts().map(|(a, b)| (*a, *b)).collect(),
            total_supply: ledger.total_supply(),
            escrowed: ledger.total_escrowed(),
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        for (address, balance) in &self.accounts {
            hasher.update(address.as_bytes());
            hasher.update(balance.raw().to_le_bytes());
        }
        hasher.update(self.total_supply.raw().to_le_bytes());
        hasher.update(self.escrowed.raw().to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches the balance data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Rebuild the ledger, rejecting tampered or inconsistent snapshots.
    pub fn restore(&self) -> Result<LedgerStore, LedgerError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        if !self.verify() {
            return Err(LedgerError::Snapshot("hash mismatch".into()));
        }
        LedgerStore::from_parts(self.accounts.iter().copied(), self.total_supply, self.escrowed)
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Number of accounts in this snapshot.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}
