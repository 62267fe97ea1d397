//! State files: the whole ledger state on disk.
//!
//! Balances are stored as a [`LedgerSnapshot`] so they carry their own
//! integrity hash. The rest of the state is stored alongside it, and a second
//! Blake2b-256 hash covers the format version, the snapshot hash and that
//! remaining state. Loading checks both hashes and the cross-component
//! invariants before handing the state back.

use std::path::Path;

use nmr_deposit::DepositRouter;
use nmr_disbursement::DisbursementScheduler;
use nmr_governance::DelegateGovernor;
use nmr_ledger::LedgerSnapshot;
use nmr_stake::StakeManager;
use nmr_tournament::TournamentRegistry;
use nmr_types::{ProtocolParams, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::state::NumeraireState;

/// Current state file format version.
pub const STATE_FILE_VERSION: u32 = 1;

/// Everything except balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct StateBody {
    params: ProtocolParams,
    scheduler: DisbursementScheduler,
    registry: TournamentRegistry,
    stakes: StakeManager,
    governor: DelegateGovernor,
    router: DepositRouter,
}

/// A persisted ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    /// When the file was written. Not covered by the hash.
    pub saved_at: Timestamp,
    pub hash: [u8; 32],
    ledger: LedgerSnapshot,
    body: StateBody,
}

impl StateFile {
    /// Capture `state` as of `saved_at`.
    pub fn create(state: &NumeraireState, saved_at: Timestamp) -> Result<Self, ContractError> {
        let body = StateBody {
            params: state.params.clone(),
            scheduler: state.scheduler.clone(),
            registry: state.registry.clone(),
            stakes: state.stakes.clone(),
            governor: state.governor.clone(),
            router: state.router.clone(),
        };
        let mut file = Self {
            version: STATE_FILE_VERSION,
            saved_at,
            hash: [0u8; 32],
            ledger: LedgerSnapshot::create(&state.ledger, saved_at),
            body,
        };
        file.hash = file.compute_hash()?;
        Ok(file)
    }

    fn compute_hash(&self) -> Result<[u8; 32], ContractError> {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let body =
            bincode::serialize(&self.body).map_err(|e| ContractError::Snapshot(e.to_string()))?;
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.ledger.hash);
        hasher.update(&body);

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        Ok(out)
    }

    /// Whether both the state hash and the balance snapshot hash match.
    pub fn verify(&self) -> bool {
        self.ledger.verify() && self.compute_hash().is_ok_and(|hash| hash == self.hash)
    }

    /// Rebuild the state, rejecting tampered or inconsistent files.
    pub fn restore(&self) -> Result<NumeraireState, ContractError> {
        if self.version != STATE_FILE_VERSION {
            return Err(ContractError::Snapshot(format!(
                "unsupported state file version {}",
                self.version
            )));
        }
        if !self.verify() {
            return Err(ContractError::Snapshot("hash mismatch".into()));
        }
        let ledger = self
            .ledger
            .restore()
            .map_err(|e| ContractError::Snapshot(e.to_string()))?;
        let body = self.body.clone();
        let state = NumeraireState {
            params: body.params,
            ledger,
            scheduler: body.scheduler,
            registry: body.registry,
            stakes: body.stakes,
            governor: body.governor,
            router: body.router,
        };
        if !state.is_consistent() {
            return Err(ContractError::Snapshot(
                "escrow does not match active stakes".into(),
            ));
        }
        Ok(state)
    }

    /// Serialize to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContractError> {
        bincode::serialize(self).map_err(|e| ContractError::Snapshot(e.to_string()))
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContractError> {
        bincode::deserialize(bytes).map_err(|e| ContractError::Snapshot(e.to_string()))
    }
}

/// Write `state` to `path`, replacing any existing file.
///
/// Written to a sibling `.tmp` file and renamed into place.
pub fn save(state: &NumeraireState, path: &Path, now: Timestamp) -> Result<(), ContractError> {
    let bytes = StateFile::create(state, now)?.to_bytes()?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, &bytes)?;
    std::fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "state saved");
    Ok(())
}

/// Read and verify the state file at `path`.
pub fn load(path: &Path) -> Result<NumeraireState, ContractError> {
    let bytes = std::fs::read(path)?;
    let state = StateFile::from_bytes(&bytes)?.restore()?;
    tracing::debug!(
        path = %path.display(),
        accounts = state.ledger.account_count(),
        "state loaded"
    );
    Ok(state)
}
