//! Nullable infrastructure for deterministic testing.
//!
//! The ledger reads time only through the [`nmr_types::Clock`] trait. This
//! crate provides a controllable implementation so tests can step across
//! disbursement periods and round deadlines without waiting.

pub mod clock;

pub use clock::NullClock;
