//! Raffle Ledger
//!
//! Decides and records claims for a single time-boxed reward event.
//!
//! # Overview
//!
//! The ledger crate is responsible for:
//! - **Arbitration**: exactly one recorded outcome per identifier, and a winner that never changes
//! - **Gating**: claims at or after the deadline are answered with `EventClosed` and never recorded
//! - **Durability**: every recorded outcome is saved before the caller sees it
//! - **Metrics**: counting outcomes, rejected input and write conflicts
//!
//! # Architecture
//!
//! [`ClaimService`] is the entry point. It validates the identifier and checks
//! the clock gate, then hands the claim to [`ClaimLedger`], which owns the
//! store and the randomness source. The ledger runs load, decide and save as
//! one unit under a lock, and saves with compare-and-set so that two
//! processes sharing one database cannot both take the last slot.
//!
//! | Situation | Outcome | Recorded |
//! |-----------|---------|----------|
//! | Identifier already recorded as the winner | `AlreadyWon` | no |
//! | Identifier already recorded otherwise | `AlreadyParticipated` | no |
//! | At or after the deadline | `EventClosed` | no |
//! | No slot left | `SlotsExhausted` | yes |
//! | Draw below the win probability | `Won` | yes |
//! | Draw at or above it | `Lost` | yes |
//!
//! # Usage
//!
//! ```
//! use raffle_domain::{ManualClock, Outcome, Timestamp};
//! use raffle_ledger::{ClaimLedger, ClaimService, FixedRandom, LotteryConfig};
//! use raffle_store::MemoryStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = ClaimLedger::new(MemoryStore::new(), FixedRandom::always_lose(), LotteryConfig::default())?;
//! let service = ClaimService::open(ledger, ManualClock::new(Timestamp::from_millis(0)))?;
//!
//! let outcome = service.submit_now("user-42")?;
//! assert_eq!(outcome, Outcome::Lost);
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Presets
//!
//! ```
//! use raffle_ledger::LotteryConfig;
//!
//! // Default: one slot, 30% win chance, 90 day window
//! let config = LotteryConfig::default();
//!
//! // Generous: every first claim wins while a slot is free
//! let config = LotteryConfig::generous();
//! ```
//!
//! # Configuration
//!
//! The ledger can be configured via TOML:
//!
//! ```toml
//! [lottery]
//! event_key = "lottery_data"
//! slot_count = 1
//! win_probability = 0.3
//! duration_days = 90
//! max_save_attempts = 3
//! store_timeout_ms = 2000
//! database = "raffle.db"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod ledger;
mod metrics;
mod random;
mod service;
mod worker;

pub use config::{ConfigError, LotteryConfig};
pub use error::ClaimError;
pub use ledger::ClaimLedger;
pub use metrics::ClaimMetrics;
pub use random::{FixedRandom, SeededRandom, ThreadRandom};
pub use service::{ClaimService, StatusSnapshot};
pub use worker::CountdownWorker;
