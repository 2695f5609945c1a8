//! Claim ledger - the single owner of the lottery state

use crate::{ClaimError, ConfigError, LotteryConfig};
use raffle_domain::gate;
use raffle_domain::{
    LotteryState, Outcome, ParticipantId, RandomSource, RecordedOutcome, SaveOutcome, StateStore, Timestamp, Version,
};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

struct LedgerInner<S, R> {
    store: S,
    rng: R,
}

/// The ledger decides and records claims
///
/// It is the only component that reads or writes the [`LotteryState`]. Each
/// claim runs load → decide → save as one unit under an internal lock, and
/// every save is a compare-and-set against the version that was loaded, so
/// two writers sharing a store can never both take the last slot. A lost
/// compare-and-set re-runs the whole unit, up to `max_save_attempts` times.
///
/// # Examples
///
/// ```
/// use raffle_domain::{Outcome, ParticipantId, Timestamp};
/// use raffle_ledger::{ClaimLedger, FixedRandom, LotteryConfig};
/// use raffle_store::MemoryStore;
///
/// let ledger = ClaimLedger::new(MemoryStore::new(), FixedRandom::always_win(), LotteryConfig::default()).unwrap();
/// let now = Timestamp::from_millis(0);
/// let u1 = ParticipantId::parse("u1").unwrap();
///
/// assert_eq!(ledger.claim(&u1, now).unwrap(), Outcome::Won(u1.clone()));
/// assert_eq!(ledger.claim(&u1, now).unwrap(), Outcome::AlreadyWon(u1));
/// ```
pub struct ClaimLedger<S, R> {
    inner: Mutex<LedgerInner<S, R>>,
    config: LotteryConfig,
    conflicts: AtomicU64,
}

impl<S, R> ClaimLedger<S, R>
where
    S: StateStore,
    S::Error: Display,
    R: RandomSource,
{
    /// Create a ledger over `store`, drawing from `rng`
    ///
    /// # Errors
    /// Returns a configuration error if `config` does not validate.
    pub fn new(store: S, rng: R, config: LotteryConfig) -> Result<Self, ClaimError> {
        config.validate()?;
        Ok(Self {
            inner: Mutex::new(LedgerInner { store, rng }),
            config,
            conflicts: AtomicU64::new(0),
        })
    }

    /// The configuration this ledger was built with
    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    /// Compare-and-set conflicts seen so far
    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    /// Create the event's state if it does not exist yet
    ///
    /// The state is created with `opened_at = now` and the configured slot
    /// count and deadline. If it already exists it is returned unchanged.
    pub fn initialize(&self, now: Timestamp) -> Result<LotteryState, ClaimError> {
        let mut inner = self.lock()?;
        let max = self.config.max_save_attempts;
        let mut reason = String::new();

        for attempt in 1..=max {
            match self.load_or_initial(&inner.store, now) {
                Ok((state, Some(_))) => return Ok(state),
                Ok((state, None)) => match inner.store.save(&state, None) {
                    Ok(SaveOutcome::Saved(_)) => {
                        info!(
                            event = %self.config.event_key,
                            slots = state.slot_count(),
                            deadline = %state.deadline(),
                            "Lottery state created"
                        );
                        return Ok(state);
                    }
                    Ok(SaveOutcome::Conflict) => {
                        // Someone else created it; the next load picks theirs up
                        self.conflicts.fetch_add(1, Ordering::Relaxed);
                        reason = "lottery state created concurrently".to_string();
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "Failed to create lottery state");
                        reason = e.to_string();
                    }
                },
                Err(ClaimError::Persistence { reason: e, .. }) => {
                    warn!(attempt, error = %e, "Failed to load lottery state");
                    reason = e;
                }
                Err(e) => return Err(e),
            }
        }

        error!(attempts = max, reason = %reason, "Giving up on creating lottery state");
        Err(ClaimError::Persistence { attempts: max, reason })
    }

    /// Current state, or the state that would be created at `now`
    ///
    /// Never writes.
    pub fn state(&self, now: Timestamp) -> Result<LotteryState, ClaimError> {
        let inner = self.lock()?;
        self.load_or_initial(&inner.store, now).map(|(state, _)| state)
    }

    /// Slots available to a claim made at `now`; zero once closed or taken
    pub fn remaining_slots(&self, now: Timestamp) -> Result<u32, ClaimError> {
        Ok(self.state(now)?.remaining_slots(now))
    }

    /// Process one claim
    ///
    /// 1. An identifier seen before gets back what it got the first time
    ///    (`AlreadyWon` or `AlreadyParticipated`); nothing is written.
    /// 2. After the deadline the answer is `EventClosed`; nothing is written.
    /// 3. With no slot left the identifier is recorded as `SlotsExhausted`.
    /// 4. Otherwise one draw decides `Won` or `Lost`, and that is recorded.
    ///
    /// Recorded outcomes are durably saved before this returns. If the save
    /// cannot be made to stick, the result is [`ClaimError::Persistence`] and
    /// the decision is discarded.
    pub fn claim(&self, id: &ParticipantId, now: Timestamp) -> Result<Outcome, ClaimError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let max = self.config.max_save_attempts;
        let mut reason = String::new();

        for attempt in 1..=max {
            let (mut state, version) = match self.load_or_initial(&inner.store, now) {
                Ok(loaded) => loaded,
                Err(ClaimError::Persistence { reason: e, .. }) => {
                    warn!(attempt, error = %e, "Failed to load lottery state");
                    reason = e;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let outcome = Self::decide(&mut state, id, now, self.config.win_probability, &mut inner.rng)?;

            if outcome.recorded().is_none() {
                debug!(participant = %id, outcome = outcome.kind(), "Claim answered without a write");
                return Ok(outcome);
            }

            match inner.store.save(&state, version) {
                Ok(SaveOutcome::Saved(saved)) => {
                    info!(
                        participant = %id,
                        outcome = outcome.kind(),
                        version = saved.value(),
                        "Claim recorded"
                    );
                    return Ok(outcome);
                }
                Ok(SaveOutcome::Conflict) => {
                    self.conflicts.fetch_add(1, Ordering::Relaxed);
                    warn!(attempt, participant = %id, "Lottery state changed during claim, retrying");
                    reason = "lottery state changed concurrently".to_string();
                }
                Err(e) => {
                    warn!(attempt, participant = %id, error = %e, "Failed to save lottery state");
                    reason = e.to_string();
                }
            }
        }

        error!(participant = %id, attempts = max, reason = %reason, "Giving up on claim");
        Err(ClaimError::Persistence { attempts: max, reason })
    }

    /// Apply the decision rule to an in-memory copy of the state
    fn decide(
        state: &mut LotteryState,
        id: &ParticipantId,
        now: Timestamp,
        win_probability: f64,
        rng: &mut R,
    ) -> Result<Outcome, ClaimError> {
        if let Some(previous) = state.participation(id) {
            return Ok(match previous.outcome {
                RecordedOutcome::Won => Outcome::AlreadyWon(id.clone()),
                recorded => Outcome::AlreadyParticipated { recorded },
            });
        }

        if !gate::is_open(now, state.deadline()) {
            return Ok(Outcome::EventClosed);
        }

        let outcome = if state.open_slots() == 0 {
            Outcome::SlotsExhausted
        } else if rng.draw() < win_probability {
            Outcome::Won(id.clone())
        } else {
            Outcome::Lost
        };

        if let Some(recorded) = outcome.recorded() {
            state.record(id.clone(), recorded, now).map_err(ClaimError::Internal)?;
        }

        Ok(outcome)
    }

    /// The stored state with its version, or a fresh one opened at `now`
    ///
    /// Store failures come back as a single-attempt `Persistence` error so
    /// callers can retry them; anything else is final.
    fn load_or_initial(&self, store: &S, now: Timestamp) -> Result<(LotteryState, Option<Version>), ClaimError> {
        let stored = store.load().map_err(|e| ClaimError::Persistence {
            attempts: 1,
            reason: e.to_string(),
        })?;

        match stored {
            Some(stored) => Ok((stored.value, Some(stored.version))),
            None => Ok((self.fresh_state(now)?, None)),
        }
    }

    fn fresh_state(&self, now: Timestamp) -> Result<LotteryState, ClaimError> {
        let deadline = self.config.deadline_from(now);
        if deadline <= now {
            return Err(ConfigError::Invalid(format!(
                "deadline {} is not after the opening time {}",
                deadline, now
            ))
            .into());
        }

        LotteryState::new(self.config.slot_count, now, deadline).map_err(|e| ConfigError::Invalid(e).into())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerInner<S, R>>, ClaimError> {
        self.inner.lock().map_err(|_| ClaimError::Persistence {
            attempts: 0,
            reason: "ledger lock poisoned".to_string(),
        })
    }
}
