//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use raffle_domain::Outcome;
use raffle_ledger::StatusSnapshot;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a claim.
    pub fn format_outcome(&self, outcome: &Outcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcome_json(outcome),
            OutputFormat::Table => Ok(self.format_outcome_message(outcome)),
            OutputFormat::Quiet => Ok(outcome.kind().to_string()),
        }
    }

    fn format_outcome_json(&self, outcome: &Outcome) -> Result<String> {
        let participant = match outcome {
            Outcome::Won(id) | Outcome::AlreadyWon(id) => Some(id.as_str()),
            _ => None,
        };
        let recorded = match outcome {
            Outcome::AlreadyParticipated { recorded } => Some(recorded.as_str()),
            _ => None,
        };

        let value = serde_json::json!({
            "outcome": outcome.kind(),
            "message": outcome.message(),
            "participant": participant,
            "recorded": recorded,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_outcome_message(&self, outcome: &Outcome) -> String {
        let message = outcome.message();
        match outcome {
            Outcome::Won(_) => self.colorize(&format!("🎉 {}", message), "green"),
            Outcome::AlreadyWon(_) | Outcome::AlreadyParticipated { .. } => self.info(&message),
            Outcome::Lost | Outcome::SlotsExhausted => self.warning(&message),
            Outcome::EventClosed => self.error(&message),
        }
    }

    /// Format an event status snapshot.
    pub fn format_status(&self, status: &StatusSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_status_json(status),
            OutputFormat::Table => Ok(self.format_status_table(status)),
            OutputFormat::Quiet => Ok(if status.open {
                status.countdown.to_string()
            } else {
                "closed".to_string()
            }),
        }
    }

    fn format_status_json(&self, status: &StatusSnapshot) -> Result<String> {
        let value = serde_json::json!({
            "open": status.open,
            "now_ms": status.now.as_millis(),
            "opened_at_ms": status.opened_at.as_millis(),
            "deadline_ms": status.deadline.as_millis(),
            "time_remaining_secs": status.time_remaining.as_secs(),
            "countdown": {
                "days": status.countdown.days,
                "hours": status.countdown.hours,
                "minutes": status.countdown.minutes,
                "seconds": status.countdown.seconds,
            },
            "progress": status.progress,
            "slot_count": status.slot_count,
            "remaining_slots": status.remaining_slots,
            "winner": status.winner.as_ref().map(|w| w.as_str()),
            "participants": status.participants,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_status_table(&self, status: &StatusSnapshot) -> String {
        let state = if status.open {
            self.colorize("open", "green")
        } else {
            self.colorize("closed", "red")
        };
        let slots = format!("{} / {}", status.remaining_slots, status.slot_count);
        let winner = status
            .winner
            .as_ref()
            .map_or_else(|| "-".to_string(), |w| w.to_string());

        let rows = [
            ("Status", state),
            ("Time remaining", status.countdown.to_string()),
            ("Progress", format_progress(status.progress)),
            ("Deadline (ms)", status.deadline.as_millis().to_string()),
            ("Slots remaining", slots),
            ("Winner", winner),
            ("Participants", status.participants.to_string()),
        ];

        let mut builder = Builder::default();
        for (field, value) in rows {
            builder.push_record([field.to_string(), value]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Columns::first()).with(Alignment::left()));

        table.to_string()
    }

    /// Format a single countdown line for the watch command.
    pub fn format_tick(&self, status: &StatusSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(&serde_json::json!({
                "open": status.open,
                "time_remaining_secs": status.time_remaining.as_secs(),
                "progress": status.progress,
                "remaining_slots": status.remaining_slots,
            }))?),
            OutputFormat::Quiet => Ok(status.countdown.total_seconds().to_string()),
            OutputFormat::Table => {
                if status.open {
                    Ok(format!(
                        "{} {} | {} | {} slot(s) left",
                        self.colorize("⏳", "cyan"),
                        status.countdown,
                        format_progress(status.progress),
                        status.remaining_slots
                    ))
                } else {
                    Ok(self.error("The event has closed."))
                }
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Whether machine-readable output was requested.
    pub fn is_plain(&self) -> bool {
        !matches!(self.format, OutputFormat::Table)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render an elapsed fraction as a percentage.
pub fn format_progress(progress: f64) -> String {
    format!("{:.1}%", progress * 100.0)
}
