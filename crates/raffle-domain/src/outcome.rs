//! Outcome module - the tagged result of a claim

use crate::{ParticipantId, RecordedOutcome};
use std::fmt;

/// Result of submitting a claim
///
/// These are business outcomes, not errors. Infrastructure faults and invalid
/// input are reported separately by the ledger crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The participant took a slot
    Won(ParticipantId),

    /// The draw went against the participant
    Lost,

    /// The participant already won; repeating the claim changes nothing
    AlreadyWon(ParticipantId),

    /// The participant already claimed and did not win
    AlreadyParticipated {
        /// What was decided the first time
        recorded: RecordedOutcome,
    },

    /// Every slot was already taken
    SlotsExhausted,

    /// The deadline has passed
    EventClosed,
}

impl Outcome {
    /// Short machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Won(_) => "won",
            Outcome::Lost => "lost",
            Outcome::AlreadyWon(_) => "already_won",
            Outcome::AlreadyParticipated { .. } => "already_participated",
            Outcome::SlotsExhausted => "slots_exhausted",
            Outcome::EventClosed => "event_closed",
        }
    }

    /// Whether this claim (or the original one it repeats) won
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Won(_) | Outcome::AlreadyWon(_))
    }

    /// Whether the identifier had already claimed
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Outcome::AlreadyWon(_) | Outcome::AlreadyParticipated { .. })
    }

    /// The entry a fresh claim leaves in the ledger, if it left one
    pub fn recorded(&self) -> Option<RecordedOutcome> {
        match self {
            Outcome::Won(_) => Some(RecordedOutcome::Won),
            Outcome::Lost => Some(RecordedOutcome::Lost),
            Outcome::SlotsExhausted => Some(RecordedOutcome::SlotsExhausted),
            _ => None,
        }
    }

    /// User-facing message for this outcome
    pub fn message(&self) -> String {
        match self {
            Outcome::Won(id) => format!("Congratulations, you won! Your UID: {}", id),
            Outcome::Lost => "Sorry, you did not win this time. Thanks for taking part!".to_string(),
            Outcome::AlreadyWon(id) => format!("You have already won with UID {}.", id),
            Outcome::AlreadyParticipated { .. } => {
                "You have already taken part. Each UID may only take part once.".to_string()
            }
            Outcome::SlotsExhausted => "All slots have been taken. Better luck next time!".to_string(),
            Outcome::EventClosed => "The event has ended.".to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_won_message_carries_identifier() {
        let id = ParticipantId::parse("u1").unwrap();
        let outcome = Outcome::Won(id);
        assert!(outcome.message().contains("u1"));
        assert!(outcome.is_win());
        assert!(!outcome.is_duplicate());
    }

    #[test]
    fn test_duplicates_are_never_losses() {
        let id = ParticipantId::parse("u1").unwrap();
        let again = Outcome::AlreadyWon(id);
        assert!(again.is_win());
        assert!(again.is_duplicate());
        assert_ne!(again.kind(), Outcome::Lost.kind());

        let repeated = Outcome::AlreadyParticipated { recorded: RecordedOutcome::Lost };
        assert!(repeated.is_duplicate());
        assert!(!repeated.is_win());
    }

    #[test]
    fn test_recorded_mapping() {
        assert_eq!(Outcome::SlotsExhausted.recorded(), Some(RecordedOutcome::SlotsExhausted));
        assert_eq!(Outcome::EventClosed.recorded(), None);
        assert_eq!(Outcome::AlreadyParticipated { recorded: RecordedOutcome::Lost }.recorded(), None);
    }
}
