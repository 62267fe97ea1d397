//! The balance ledger.
//!
//! Every balance mutation in the system funnels through [`LedgerStore`]:
//! minting, transfers, and the escrow that backs active stakes. The store
//! holds the only copy of each balance; other components borrow it.

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::LedgerError;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use store::LedgerStore;
