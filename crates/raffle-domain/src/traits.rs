//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the decision logic and
//! infrastructure. Implementations live in other crates.

use crate::LotteryState;

/// Monotonic revision of a stored state, used for compare-and-set writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u64);

impl Version {
    /// Version assigned to the first saved revision
    pub const FIRST: Version = Version(1);

    /// Create a version from its raw value (storage layer use)
    pub const fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The revision that follows this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// A loaded value together with the version it was stored under
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The stored value
    pub value: T,

    /// Version to pass back when saving a modification
    pub version: Version,
}

/// Result of a compare-and-set save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; the state now lives under this version
    Saved(Version),

    /// Someone else wrote first; nothing was written
    Conflict,
}

/// Trait for loading and saving the lottery state
///
/// A store holds exactly one state, under one well-known key for the event's
/// lifetime. Implemented by the infrastructure layer (raffle-store).
pub trait StateStore {
    /// Error type for store operations
    type Error;

    /// Load the current state, or `None` if the event was never created
    fn load(&self) -> Result<Option<Versioned<LotteryState>>, Self::Error>;

    /// Save `state` if the stored version still equals `expected`
    ///
    /// `expected = None` means "only if nothing is stored yet". The full state
    /// is written atomically: either every change lands or none does.
    fn save(&mut self, state: &LotteryState, expected: Option<Version>) -> Result<SaveOutcome, Self::Error>;
}

/// Source of win/lose draws
///
/// Implemented by the application layer (raffle-ledger).
pub trait RandomSource {
    /// A uniform draw from `[0.0, 1.0)`
    fn draw(&mut self) -> f64;
}
