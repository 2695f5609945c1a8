//! Claim error types

use crate::ConfigError;
use thiserror::Error;

/// Errors that can occur while processing a claim
///
/// Business outcomes (lost, duplicate, exhausted, closed) are not errors;
/// see [`raffle_domain::Outcome`].
#[derive(Error, Debug)]
pub enum ClaimError {
    /// The identifier was rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// The state could not be read or durably written
    ///
    /// No state change should be assumed to have happened.
    #[error("Persistence failure after {attempts} attempt(s): {reason}")]
    Persistence {
        /// How many read-decide-write attempts were made
        attempts: u32,
        /// Last underlying failure
        reason: String,
    },

    /// A decision would have broken a ledger invariant; nothing was written
    #[error("Ledger invariant violated: {0}")]
    Internal(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClaimError {
    /// Whether the caller supplied bad input (as opposed to an infrastructure fault)
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ClaimError::Validation(_))
    }
}
