//! Claim service - the entry point callers talk to
//!
//! The service checks the identifier and the clock gate, and only then hands
//! the claim to the [`ClaimLedger`]. A submission after the deadline is
//! answered here and never reaches the ledger.

use crate::{ClaimError, ClaimLedger, ClaimMetrics};
use raffle_domain::gate::{self, Countdown};
use raffle_domain::{Clock, Outcome, ParticipantId, RandomSource, StateStore, Timestamp};
use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Everything a renderer needs to show the state of the event at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// When the snapshot was taken
    pub now: Timestamp,

    /// When the event opened
    pub opened_at: Timestamp,

    /// When the event closes
    pub deadline: Timestamp,

    /// Whether claims are accepted at `now`
    pub open: bool,

    /// Configured number of winning slots
    pub slot_count: u32,

    /// Slots a claim made at `now` could still take
    pub remaining_slots: u32,

    /// The first winner, if any
    pub winner: Option<ParticipantId>,

    /// Number of identifiers recorded so far
    pub participants: usize,

    /// Time left until the deadline
    pub time_remaining: Duration,

    /// `time_remaining` broken into days, hours, minutes and seconds
    pub countdown: Countdown,

    /// Elapsed fraction of the event window
    pub progress: f64,
}

/// Gate-then-ledger orchestration over an injected clock
///
/// # Examples
///
/// ```
/// use raffle_domain::{ManualClock, Outcome, Timestamp};
/// use raffle_ledger::{ClaimLedger, ClaimService, FixedRandom, LotteryConfig};
/// use raffle_store::MemoryStore;
///
/// let ledger = ClaimLedger::new(MemoryStore::new(), FixedRandom::always_win(), LotteryConfig::default()).unwrap();
/// let service = ClaimService::open(ledger, ManualClock::new(Timestamp::from_millis(0))).unwrap();
///
/// assert!(service.submit_now("u1").unwrap().is_win());
/// assert_eq!(service.submit_now("u2").unwrap(), Outcome::SlotsExhausted);
/// ```
pub struct ClaimService<S, R, C> {
    ledger: ClaimLedger<S, R>,
    clock: C,
    opened_at: Timestamp,
    deadline: Timestamp,
    metrics: Mutex<ClaimMetrics>,
}

impl<S, R, C> ClaimService<S, R, C>
where
    S: StateStore,
    S::Error: Display,
    R: RandomSource,
    C: Clock,
{
    /// Open the event, creating its state at the clock's current time if needed
    ///
    /// The window of an existing event is kept as stored.
    pub fn open(ledger: ClaimLedger<S, R>, clock: C) -> Result<Self, ClaimError> {
        let state = ledger.initialize(clock.now())?;
        debug!(
            opened_at = %state.opened_at(),
            deadline = %state.deadline(),
            "Claim service ready"
        );

        Ok(Self {
            ledger,
            clock,
            opened_at: state.opened_at(),
            deadline: state.deadline(),
            metrics: Mutex::new(ClaimMetrics::new()),
        })
    }

    /// Submit a claim evaluated at `now`
    ///
    /// Blank or malformed identifiers fail with [`ClaimError::Validation`]
    /// and a closed event answers [`Outcome::EventClosed`]; in both cases the
    /// ledger is not consulted.
    pub fn submit(&self, raw: &str, now: Timestamp) -> Result<Outcome, ClaimError> {
        let id = match ParticipantId::parse(raw) {
            Ok(id) => id,
            Err(reason) => {
                debug!(reason = %reason, "Rejected identifier");
                self.counters().record_validation_failure();
                return Err(ClaimError::Validation(reason));
            }
        };

        if !gate::is_open(now, self.deadline) {
            debug!(participant = %id, now = %now, deadline = %self.deadline, "Claim after deadline");
            let outcome = Outcome::EventClosed;
            self.counters().record_outcome(&outcome);
            return Ok(outcome);
        }

        match self.ledger.claim(&id, now) {
            Ok(outcome) => {
                if outcome.is_win() {
                    info!(participant = %id, "Winner drawn");
                }
                self.counters().record_outcome(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                match e {
                    ClaimError::Persistence { .. } => self.counters().record_persistence_failure(),
                    _ => self.counters().record_other_failure(),
                }
                Err(e)
            }
        }
    }

    /// Submit a claim at the clock's current time
    pub fn submit_now(&self, raw: &str) -> Result<Outcome, ClaimError> {
        self.submit(raw, self.clock.now())
    }

    /// Slots still available at `now`; zero once the event has closed
    pub fn remaining_slots(&self, now: Timestamp) -> Result<u32, ClaimError> {
        if !gate::is_open(now, self.deadline) {
            return Ok(0);
        }
        self.ledger.remaining_slots(now)
    }

    /// Time left until the deadline; zero once closed
    pub fn time_remaining(&self, now: Timestamp) -> Duration {
        gate::time_remaining(now, self.deadline)
    }

    /// Countdown to the deadline
    pub fn countdown(&self, now: Timestamp) -> Countdown {
        Countdown::between(now, self.deadline)
    }

    /// Elapsed fraction of the event window
    pub fn progress(&self, now: Timestamp) -> f64 {
        gate::progress(self.opened_at, now, self.deadline)
    }

    /// Whether claims are accepted at `now`
    pub fn is_open(&self, now: Timestamp) -> bool {
        gate::is_open(now, self.deadline)
    }

    /// Aggregate snapshot of the event at `now`
    pub fn status(&self, now: Timestamp) -> Result<StatusSnapshot, ClaimError> {
        let state = self.ledger.state(now)?;
        let time_remaining = self.time_remaining(now);

        Ok(StatusSnapshot {
            now,
            opened_at: self.opened_at,
            deadline: self.deadline,
            open: self.is_open(now),
            slot_count: state.slot_count(),
            remaining_slots: state.remaining_slots(now),
            winner: state.winner().cloned(),
            participants: state.participants().len(),
            time_remaining,
            countdown: Countdown::from_remaining(time_remaining),
            progress: self.progress(now),
        })
    }

    /// Snapshot at the clock's current time
    pub fn status_now(&self) -> Result<StatusSnapshot, ClaimError> {
        self.status(self.clock.now())
    }

    /// Counters for this service, including ledger write conflicts
    pub fn metrics(&self) -> ClaimMetrics {
        let mut metrics = self.counters().clone();
        metrics.conflicts = self.ledger.conflicts();
        metrics
    }

    /// The event deadline
    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    /// When the event opened
    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    /// The injected clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The underlying ledger
    pub fn ledger(&self) -> &ClaimLedger<S, R> {
        &self.ledger
    }

    fn counters(&self) -> MutexGuard<'_, ClaimMetrics> {
        // Counters stay usable even if a panicking thread held the lock
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
