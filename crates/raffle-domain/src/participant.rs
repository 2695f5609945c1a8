//! Participant identifiers

use std::fmt;

/// Longest identifier accepted, in characters
pub const MAX_PARTICIPANT_ID_LEN: usize = 128;

/// A validated participant identifier
///
/// Surrounding whitespace is trimmed on construction, so `" u1 "` and `"u1"`
/// name the same participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Parse and validate a raw identifier
    ///
    /// # Errors
    /// Returns an error if the identifier is blank, too long, or contains
    /// control characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle_domain::ParticipantId;
    ///
    /// let id = ParticipantId::parse("  u1 ").unwrap();
    /// assert_eq!(id.as_str(), "u1");
    /// assert!(ParticipantId::parse("   ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err("Participant identifier cannot be empty".to_string());
        }

        if trimmed.chars().count() > MAX_PARTICIPANT_ID_LEN {
            return Err(format!(
                "Participant identifier exceeds {} characters",
                MAX_PARTICIPANT_ID_LEN
            ));
        }

        if trimmed.chars().any(char::is_control) {
            return Err("Participant identifier contains control characters".to_string());
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
