//! Integration tests for raffle-store
//!
//! These tests verify the full load/save cycle for the lottery record,
//! including compare-and-set behaviour between independent connections.

use raffle_domain::{LotteryState, ParticipantId, RecordedOutcome, SaveOutcome, StateStore, Timestamp, Version};
use raffle_store::{MemoryStore, SqliteStore, DEFAULT_EVENT_KEY};

fn pid(s: &str) -> ParticipantId {
    ParticipantId::parse(s).unwrap()
}

fn decided_state() -> LotteryState {
    let mut state = LotteryState::new(1, Timestamp::from_millis(1_000), Timestamp::from_millis(90_000)).unwrap();
    state.record(pid("u1"), RecordedOutcome::Lost, Timestamp::from_millis(2_000)).unwrap();
    state.record(pid("u2"), RecordedOutcome::Won, Timestamp::from_millis(3_000)).unwrap();
    state.record(pid("u3"), RecordedOutcome::SlotsExhausted, Timestamp::from_millis(4_000)).unwrap();
    state
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:", DEFAULT_EVENT_KEY);
    assert!(store.is_ok(), "Store should initialize successfully");
    assert!(store.unwrap().load().unwrap().is_none(), "Fresh store should be empty");
}

#[test]
fn test_save_and_load_state() {
    let mut store = SqliteStore::new(":memory:", DEFAULT_EVENT_KEY).unwrap();
    let state = decided_state();

    let saved = store.save(&state, None).unwrap();
    assert_eq!(saved, SaveOutcome::Saved(Version::FIRST));

    let loaded = store.load().unwrap().expect("state should be stored");
    assert_eq!(loaded.version, Version::FIRST);
    assert_eq!(loaded.value, state);
    assert_eq!(loaded.value.winner(), Some(&pid("u2")));
    assert_eq!(
        loaded.value.participation(&pid("u3")).unwrap().outcome,
        RecordedOutcome::SlotsExhausted
    );
}

#[test]
fn test_saving_same_state_twice_is_idempotent() {
    let mut store = SqliteStore::new(":memory:", DEFAULT_EVENT_KEY).unwrap();
    let state = decided_state();

    store.save(&state, None).unwrap();
    let first = store.load().unwrap().unwrap();

    store.save(&state, Some(first.version)).unwrap();
    let second = store.load().unwrap().unwrap();

    assert_eq!(first.value, second.value);
    assert!(second.version > first.version);
}

#[test]
fn test_create_conflicts_when_already_created() {
    let mut store = SqliteStore::new(":memory:", DEFAULT_EVENT_KEY).unwrap();
    let state = decided_state();

    store.save(&state, None).unwrap();
    assert_eq!(store.save(&state, None).unwrap(), SaveOutcome::Conflict);
}

#[test]
fn test_incremental_saves_keep_earlier_participants() {
    let mut store = SqliteStore::new(":memory:", DEFAULT_EVENT_KEY).unwrap();
    let mut state = LotteryState::new(1, Timestamp::from_millis(0), Timestamp::from_millis(60_000)).unwrap();
    store.save(&state, None).unwrap();

    let claims = [
        ("u1", RecordedOutcome::Lost, 10),
        ("u2", RecordedOutcome::Won, 20),
        ("u3", RecordedOutcome::SlotsExhausted, 30),
    ];
    for (id, outcome, at) in claims {
        let current = store.load().unwrap().unwrap();
        state = current.value;
        state.record(pid(id), outcome, Timestamp::from_millis(at)).unwrap();
        assert!(matches!(store.save(&state, Some(current.version)).unwrap(), SaveOutcome::Saved(_)));
    }

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.version.value(), 4);
    assert_eq!(loaded.value, state);
    assert_eq!(loaded.value.participants().len(), 3);

    let first = loaded.value.participation(&pid("u1")).unwrap();
    assert_eq!(first.outcome, RecordedOutcome::Lost);
    assert_eq!(first.claimed_at, Timestamp::from_millis(10));
}

#[test]
fn test_event_keys_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raffle.db");

    let mut spring = SqliteStore::new(&path, "spring").unwrap();
    let autumn = SqliteStore::new(&path, "autumn").unwrap();

    spring.save(&decided_state(), None).unwrap();

    assert!(spring.load().unwrap().is_some());
    assert!(autumn.load().unwrap().is_none());
}

#[test]
fn test_two_connections_detect_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raffle.db");

    let mut first = SqliteStore::new(&path, DEFAULT_EVENT_KEY).unwrap();
    let mut second = SqliteStore::new(&path, DEFAULT_EVENT_KEY).unwrap();

    let base = LotteryState::new(1, Timestamp::from_millis(0), Timestamp::from_millis(60_000)).unwrap();
    first.save(&base, None).unwrap();

    // Both read version 1
    let seen_by_first = first.load().unwrap().unwrap();
    let seen_by_second = second.load().unwrap().unwrap();

    let mut a = seen_by_first.value.clone();
    a.record(pid("alice"), RecordedOutcome::Won, Timestamp::from_millis(10)).unwrap();
    let mut b = seen_by_second.value.clone();
    b.record(pid("bob"), RecordedOutcome::Won, Timestamp::from_millis(11)).unwrap();

    assert!(matches!(first.save(&a, Some(seen_by_first.version)).unwrap(), SaveOutcome::Saved(_)));
    assert_eq!(second.save(&b, Some(seen_by_second.version)).unwrap(), SaveOutcome::Conflict);

    // The losing write left nothing behind
    let stored = second.load().unwrap().unwrap().value;
    assert_eq!(stored.winner(), Some(&pid("alice")));
    assert!(!stored.has_participated(&pid("bob")));
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raffle.db");
    let state = decided_state();

    {
        let mut store = SqliteStore::new(&path, DEFAULT_EVENT_KEY).unwrap();
        store.save(&state, None).unwrap();
    }

    let reopened = SqliteStore::new(&path, DEFAULT_EVENT_KEY).unwrap();
    assert_eq!(reopened.load().unwrap().unwrap().value, state);
}

#[test]
fn test_memory_store_matches_sqlite_semantics() {
    let mut memory = MemoryStore::new();
    let mut sqlite = SqliteStore::new(":memory:", DEFAULT_EVENT_KEY).unwrap();
    let state = decided_state();

    assert_eq!(memory.save(&state, None).unwrap(), sqlite.save(&state, None).unwrap());
    assert_eq!(memory.save(&state, None).unwrap(), sqlite.save(&state, None).unwrap());
    assert_eq!(memory.load().unwrap(), sqlite.load().unwrap());
}
