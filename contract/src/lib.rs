//! The Numeraire ledger.
//!
//! [`Numeraire`] ties the component crates together behind one set of
//! caller-checked operations: minting against the weekly disbursement quota,
//! transfers, tournaments and rounds, stakes, the delegate pointer, and
//! deposit routing. [`NumeraireConfig`] and the [`persist`] module let a host
//! keep that state in a file between calls.

pub mod config;
pub mod error;
pub mod event;
pub mod numeraire;
pub mod persist;
pub mod state;

pub use config::NumeraireConfig;
pub use error::ContractError;
pub use event::{ContractEvent, EventBus};
pub use numeraire::Numeraire;
pub use persist::{load, save, StateFile, STATE_FILE_VERSION};
pub use state::NumeraireState;

pub use nmr_deposit::{DepositSweep, TransferOutcome};
pub use nmr_governance::DelegateChange;
pub use nmr_stake::Stake;
pub use nmr_tournament::{Round, Tournament};
