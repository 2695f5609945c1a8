//! SQLite-backed state store

use crate::StoreError;
use raffle_domain::{
    LotteryState, ParticipantId, Participation, RecordedOutcome, SaveOutcome, StateStore, Timestamp, Version,
    Versioned,
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// How long a write waits on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// SQLite-based implementation of StateStore
///
/// The lottery record lives in two tables: one header row per event key and
/// one row per participant. Every save runs in a single `IMMEDIATE`
/// transaction and bumps the header's version, so two stores opened on the
/// same file never overwrite each other's decisions.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance, or share one behind a lock.
pub struct SqliteStore {
    conn: Connection,
    event_key: String,
}

impl SqliteStore {
    /// Open (or create) a store at `path` for the given event key
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use raffle_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("raffle.db", "lottery_data").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P, event_key: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_timeout(path, event_key, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a store with a custom busy timeout for contended writes
    pub fn with_timeout<P: AsRef<Path>>(
        path: P,
        event_key: impl Into<String>,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        let mut store = Self {
            conn,
            event_key: event_key.into(),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// The key this store reads and writes
    pub fn event_key(&self) -> &str {
        &self.event_key
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn to_sql_int(value: u64, field: &str) -> Result<i64, StoreError> {
        i64::try_from(value).map_err(|_| StoreError::InvalidData(format!("{} out of range: {}", field, value)))
    }

    fn from_sql_int(value: i64, field: &str) -> Result<u64, StoreError> {
        u64::try_from(value).map_err(|_| StoreError::InvalidData(format!("Negative {}: {}", field, value)))
    }

    fn parse_participant(raw: &str) -> Result<ParticipantId, StoreError> {
        ParticipantId::parse(raw).map_err(StoreError::InvalidData)
    }
}

impl StateStore for SqliteStore {
    type Error = StoreError;

    fn load(&self) -> Result<Option<Versioned<LotteryState>>, Self::Error> {
        // Read header and participants from one snapshot
        let tx = self.conn.unchecked_transaction()?;

        let header = tx
            .query_row(
                "SELECT version, slot_count, opened_at, deadline, winner
                 FROM lottery WHERE event_key = ?1",
                params![&self.event_key],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((version, slot_count, opened_at, deadline, winner)) = header else {
            return Ok(None);
        };

        let rows = {
            let mut stmt = tx.prepare(
                "SELECT participant, outcome, claimed_at
                 FROM participants WHERE event_key = ?1",
            )?;
            let rows = stmt
                .query_map(params![&self.event_key], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        tx.finish()?;

        let mut participants = Vec::with_capacity(rows.len());
        for (participant, outcome, claimed_at) in rows {
            let outcome = RecordedOutcome::parse(&outcome)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown outcome: {}", outcome)))?;
            participants.push((
                Self::parse_participant(&participant)?,
                Participation {
                    outcome,
                    claimed_at: Timestamp::from_millis(Self::from_sql_int(claimed_at, "claimed_at")?),
                },
            ));
        }

        let slot_count = u32::try_from(slot_count)
            .map_err(|_| StoreError::InvalidData(format!("Invalid slot count: {}", slot_count)))?;
        let winner = winner.as_deref().map(Self::parse_participant).transpose()?;

        let state = LotteryState::from_parts(
            slot_count,
            Timestamp::from_millis(Self::from_sql_int(opened_at, "opened_at")?),
            Timestamp::from_millis(Self::from_sql_int(deadline, "deadline")?),
            winner,
            participants,
        )
        .map_err(StoreError::InvalidData)?;

        Ok(Some(Versioned {
            value: state,
            version: Version::from_value(Self::from_sql_int(version, "version")?),
        }))
    }

    fn save(&mut self, state: &LotteryState, expected: Option<Version>) -> Result<SaveOutcome, Self::Error> {
        // IMMEDIATE takes the write lock up front so the version check and the
        // write cannot interleave with another connection
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = tx
            .query_row(
                "SELECT version FROM lottery WHERE event_key = ?1",
                params![&self.event_key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|v| Self::from_sql_int(v, "version").map(Version::from_value))
            .transpose()?;

        if current != expected {
            // Dropping the transaction rolls it back
            return Ok(SaveOutcome::Conflict);
        }

        let version = current.map_or(Version::FIRST, |v| v.next());
        let version_sql = Self::to_sql_int(version.value(), "version")?;
        let opened_at = Self::to_sql_int(state.opened_at().as_millis(), "opened_at")?;
        let deadline = Self::to_sql_int(state.deadline().as_millis(), "deadline")?;
        let winner = state.winner().map(|w| w.as_str());

        if current.is_none() {
            tx.execute(
                "INSERT INTO lottery (event_key, version, slot_count, opened_at, deadline, winner)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![&self.event_key, version_sql, state.slot_count(), opened_at, deadline, winner],
            )?;
        } else {
            tx.execute(
                "UPDATE lottery
                 SET version = ?2, slot_count = ?3, opened_at = ?4, deadline = ?5, winner = ?6
                 WHERE event_key = ?1",
                params![&self.event_key, version_sql, state.slot_count(), opened_at, deadline, winner],
            )?;
        }

        // Recorded participations never change, so only new rows are written
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO participants (event_key, participant, outcome, claimed_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (id, participation) in state.participants() {
                stmt.execute(params![
                    &self.event_key,
                    id.as_str(),
                    participation.outcome.as_str(),
                    Self::to_sql_int(participation.claimed_at.as_millis(), "claimed_at")?,
                ])?;
            }
        }

        tx.commit()?;
        Ok(SaveOutcome::Saved(version))
    }
}
