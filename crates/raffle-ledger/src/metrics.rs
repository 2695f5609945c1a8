//! Metrics collection for claim processing

use raffle_domain::Outcome;
use std::collections::HashMap;

/// Metrics collected while serving claims
///
/// Tracks outcomes by kind plus the failure paths that never produce an outcome.
#[derive(Debug, Clone, Default)]
pub struct ClaimMetrics {
    /// Outcomes returned, keyed by [`Outcome::kind`]
    pub outcomes: HashMap<&'static str, usize>,

    /// Submissions rejected as invalid input
    pub validation_failures: usize,

    /// Submissions that ended in a persistence failure
    pub persistence_failures: usize,

    /// Submissions that failed for any other reason (configuration, invariant)
    pub other_failures: usize,

    /// Compare-and-set conflicts that forced a retry
    pub conflicts: u64,
}

impl ClaimMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome returned to a caller
    pub fn record_outcome(&mut self, outcome: &Outcome) {
        *self.outcomes.entry(outcome.kind()).or_insert(0) += 1;
    }

    /// Record an invalid submission
    pub fn record_validation_failure(&mut self) {
        self.validation_failures += 1;
    }

    /// Record a persistence failure
    pub fn record_persistence_failure(&mut self) {
        self.persistence_failures += 1;
    }

    /// Record a failure that is neither bad input nor storage
    pub fn record_other_failure(&mut self) {
        self.other_failures += 1;
    }

    /// Count of a given outcome kind
    pub fn count(&self, kind: &str) -> usize {
        self.outcomes.get(kind).copied().unwrap_or(0)
    }

    /// Total submissions seen, including failed ones
    pub fn total_submissions(&self) -> usize {
        self.outcomes.values().sum::<usize>() + self.validation_failures + self.persistence_failures + self.other_failures
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.outcomes.clear();
        self.validation_failures = 0;
        self.persistence_failures = 0;
        self.other_failures = 0;
        self.conflicts = 0;
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Claim Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Submissions: {}", self.total_submissions()),
        ];

        if !self.outcomes.is_empty() {
            lines.push("Outcomes:".to_string());
            let mut kinds: Vec<_> = self.outcomes.iter().collect();
            kinds.sort();
            for (kind, count) in kinds {
                lines.push(format!("  {}: {}", kind, count));
            }
        }

        lines.push(format!("Validation failures: {}", self.validation_failures));
        lines.push(format!("Persistence failures: {}", self.persistence_failures));
        lines.push(format!("Other failures: {}", self.other_failures));
        lines.push(format!("Write conflicts: {}", self.conflicts));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_domain::{ParticipantId, RecordedOutcome};

    #[test]
    fn test_metrics_creation() {
        let metrics = ClaimMetrics::new();
        assert_eq!(metrics.total_submissions(), 0);
        assert_eq!(metrics.count("won"), 0);
    }

    #[test]
    fn test_record_outcomes() {
        let mut metrics = ClaimMetrics::new();
        metrics.record_outcome(&Outcome::Lost);
        metrics.record_outcome(&Outcome::Lost);
        metrics.record_outcome(&Outcome::Won(ParticipantId::parse("u1").unwrap()));
        metrics.record_outcome(&Outcome::AlreadyParticipated { recorded: RecordedOutcome::Lost });
        metrics.record_validation_failure();

        assert_eq!(metrics.count("lost"), 2);
        assert_eq!(metrics.count("won"), 1);
        assert_eq!(metrics.count("already_participated"), 1);
        assert_eq!(metrics.total_submissions(), 5);
    }

    #[test]
    fn test_reset() {
        let mut metrics = ClaimMetrics::new();
        metrics.record_outcome(&Outcome::EventClosed);
        metrics.record_persistence_failure();
        metrics.conflicts = 4;

        metrics.reset();

        assert_eq!(metrics.total_submissions(), 0);
        assert_eq!(metrics.conflicts, 0);
    }

    #[test]
    fn test_summary() {
        let mut metrics = ClaimMetrics::new();
        metrics.record_outcome(&Outcome::SlotsExhausted);
        metrics.record_validation_failure();
        metrics.conflicts = 2;

        let summary = metrics.summary();
        assert!(summary.contains("Submissions: 2"));
        assert!(summary.contains("slots_exhausted: 1"));
        assert!(summary.contains("Validation failures: 1"));
        assert!(summary.contains("Write conflicts: 2"));
    }
}
