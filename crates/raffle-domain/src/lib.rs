//! Raffle Domain Layer
//!
//! This crate contains the decision model for the raffle: who may claim the
//! winner slot, when, and what gets recorded. It has ZERO external runtime
//! dependencies and defines the value objects and trait interfaces that the
//! store, ledger and CLI crates depend upon.
//!
//! ## Key Concepts
//!
//! - **Participant**: a validated identifier; each one may claim exactly once
//! - **LotteryState**: the single persisted aggregate (winner, participants, slots, deadline)
//! - **Outcome**: the tagged result of a claim (won, lost, duplicate, exhausted, closed)
//! - **Clock Gate**: pure time-window admission (`now < deadline`)
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure decision logic only
//! - Storage and randomness live behind traits in [`traits`]
//! - Time is always injected through [`gate::Clock`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod outcome;
pub mod participant;
pub mod state;
pub mod traits;

// Re-exports for convenience
pub use gate::{Clock, Countdown, ManualClock, SystemClock, Timestamp};
pub use outcome::Outcome;
pub use participant::ParticipantId;
pub use state::{LotteryState, Participation, RecordedOutcome};
pub use traits::{RandomSource, SaveOutcome, StateStore, Version, Versioned};
