//! Fundamental types for the Numeraire ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, amounts, timestamps and the clock, identifiers, and protocol parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod ids;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::{NmrAmount, NMR_UNIT};
pub use error::TypesError;
pub use ids::{Confidence, RoundId, TournamentId};
pub use params::ProtocolParams;
pub use time::{Clock, FixedClock, SystemClock, Timestamp, DAY_SECS, WEEK_SECS};
