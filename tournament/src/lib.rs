//! Tournament registry.
//!
//! Tournaments are created once per externally supplied id and contain an
//! ordered list of rounds. Each round has a resolution deadline, after which
//! its stakes may be released, and counts the stakes placed on it.

pub mod error;
pub mod registry;
pub mod tournament;

pub use error::TournamentError;
pub use registry::TournamentRegistry;
pub use tournament::{Round, Tournament};
