//! LotteryState - the single persisted aggregate

use crate::gate::{self, Timestamp};
use crate::ParticipantId;
use std::collections::BTreeMap;

/// What was decided for a participant the first (and only) time they claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordedOutcome {
    /// The participant took a slot
    Won,

    /// The draw went against the participant
    Lost,

    /// No slot was left when the participant claimed
    SlotsExhausted,
}

impl RecordedOutcome {
    /// Get the outcome name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordedOutcome::Won => "won",
            RecordedOutcome::Lost => "lost",
            RecordedOutcome::SlotsExhausted => "slots_exhausted",
        }
    }

    /// Parse an outcome name (storage layer use)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "won" => Some(RecordedOutcome::Won),
            "lost" => Some(RecordedOutcome::Lost),
            "slots_exhausted" => Some(RecordedOutcome::SlotsExhausted),
            _ => None,
        }
    }
}

/// A participant's entry in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participation {
    /// The recorded decision
    pub outcome: RecordedOutcome,

    /// When the claim was processed
    pub claimed_at: Timestamp,
}

/// Persisted state of one raffle event
///
/// Fields are private so that the invariants hold for every value of this
/// type:
/// - the winner, once set, never changes and is always a recorded participant
/// - each participant is recorded at most once
/// - no more participants are recorded as `Won` than there are slots
#[derive(Debug, Clone, PartialEq)]
pub struct LotteryState {
    winner: Option<ParticipantId>,
    participants: BTreeMap<ParticipantId, Participation>,
    slot_count: u32,
    deadline: Timestamp,
    opened_at: Timestamp,
}

impl LotteryState {
    /// Create an empty event
    ///
    /// # Errors
    /// Returns an error if `slot_count` is zero.
    pub fn new(slot_count: u32, opened_at: Timestamp, deadline: Timestamp) -> Result<Self, String> {
        if slot_count == 0 {
            return Err("Slot count must be at least 1".to_string());
        }

        Ok(Self {
            winner: None,
            participants: BTreeMap::new(),
            slot_count,
            deadline,
            opened_at,
        })
    }

    /// Rebuild a state from stored parts, re-checking every invariant
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_parts(
        slot_count: u32,
        opened_at: Timestamp,
        deadline: Timestamp,
        winner: Option<ParticipantId>,
        participants: impl IntoIterator<Item = (ParticipantId, Participation)>,
    ) -> Result<Self, String> {
        let mut state = Self::new(slot_count, opened_at, deadline)?;

        for (id, participation) in participants {
            if state.participants.insert(id.clone(), participation).is_some() {
                return Err(format!("Participant '{}' recorded twice", id));
            }
        }

        let wins = state.winners().count();
        if wins > slot_count as usize {
            return Err(format!("{} winners recorded for {} slot(s)", wins, slot_count));
        }

        match &winner {
            Some(id) => match state.participants.get(id) {
                Some(p) if p.outcome == RecordedOutcome::Won => {}
                _ => return Err(format!("Winner '{}' is not a recorded winning participant", id)),
            },
            None if wins > 0 => return Err("Winning participants recorded without a winner".to_string()),
            None => {}
        }

        state.winner = winner;
        Ok(state)
    }

    /// The first participant to win, if any
    pub fn winner(&self) -> Option<&ParticipantId> {
        self.winner.as_ref()
    }

    /// Every participant recorded as `Won`
    pub fn winners(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants
            .iter()
            .filter(|(_, p)| p.outcome == RecordedOutcome::Won)
            .map(|(id, _)| id)
    }

    /// All recorded participants
    pub fn participants(&self) -> &BTreeMap<ParticipantId, Participation> {
        &self.participants
    }

    /// The recorded entry for `id`, if it has claimed before
    pub fn participation(&self, id: &ParticipantId) -> Option<&Participation> {
        self.participants.get(id)
    }

    /// Whether `id` has claimed before
    pub fn has_participated(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    /// Configured number of reward slots
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Slots not yet taken, ignoring the deadline
    pub fn open_slots(&self) -> u32 {
        let taken = u32::try_from(self.winners().count()).unwrap_or(u32::MAX);
        self.slot_count.saturating_sub(taken)
    }

    /// Slots available to a claim made at `now`; zero once closed
    pub fn remaining_slots(&self, now: Timestamp) -> u32 {
        if gate::is_open(now, self.deadline) {
            self.open_slots()
        } else {
            0
        }
    }

    /// Claims are not accepted at or after this time
    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    /// When the event was created
    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    /// Record a first-time participant
    ///
    /// Recording `Won` also sets the winner if none is set yet.
    ///
    /// # Errors
    /// Returns an error if the participant was already recorded, or if a win
    /// is recorded with no slot left.
    pub fn record(
        &mut self,
        id: ParticipantId,
        outcome: RecordedOutcome,
        claimed_at: Timestamp,
    ) -> Result<(), String> {
        if self.has_participated(&id) {
            return Err(format!("Participant '{}' already recorded", id));
        }

        if outcome == RecordedOutcome::Won {
            if self.open_slots() == 0 {
                return Err(format!("No slot left for participant '{}'", id));
            }
            if self.winner.is_none() {
                self.winner = Some(id.clone());
            }
        }

        self.participants.insert(id, Participation { outcome, claimed_at });
        Ok(())
    }
}
