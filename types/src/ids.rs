//! Identifiers for tournaments, rounds and stakes.

/// Externally supplied tournament identifier.
pub type TournamentId = u64;

/// Round identifier, unique within its tournament.
pub type RoundId = u64;

/// Opaque tag a staker attaches to a stake. Never interpreted by the ledger.
pub type Confidence = u64;
