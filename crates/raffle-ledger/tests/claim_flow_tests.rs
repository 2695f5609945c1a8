//! End-to-end claim tests against a SQLite file
//!
//! These exercise the service, ledger and store together, including several
//! independent connections racing for the same slot.

use raffle_domain::{ManualClock, Outcome, ParticipantId, RecordedOutcome, Timestamp};
use raffle_ledger::{ClaimError, ClaimLedger, ClaimService, FixedRandom, LotteryConfig, SeededRandom};
use raffle_store::{SqliteStore, DEFAULT_EVENT_KEY};
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const START_MS: u64 = 1_700_000_000_000;
const HOUR_MS: u64 = 3_600_000;

fn config(db: &Path) -> LotteryConfig {
    LotteryConfig {
        deadline_ms: Some(START_MS + HOUR_MS),
        database: db.to_path_buf(),
        ..LotteryConfig::default()
    }
}

fn open_service(
    config: &LotteryConfig,
    rng: FixedRandom,
) -> ClaimService<SqliteStore, FixedRandom, ManualClock> {
    let store = SqliteStore::with_timeout(&config.database, &config.event_key, config.store_timeout()).unwrap();
    let ledger = ClaimLedger::new(store, rng, config.clone()).unwrap();
    ClaimService::open(ledger, ManualClock::new(Timestamp::from_millis(START_MS))).unwrap()
}

fn at(offset_ms: u64) -> Timestamp {
    Timestamp::from_millis(START_MS + offset_ms)
}

#[test]
fn test_repeat_claim_reports_participation() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&config(&dir.path().join("raffle.db")), FixedRandom::always_lose());

    let first = service.submit("u1", at(0)).unwrap();
    assert!(matches!(first, Outcome::Won(_) | Outcome::Lost));

    let second = service.submit("u1", at(1)).unwrap();
    assert_eq!(second, Outcome::AlreadyParticipated { recorded: RecordedOutcome::Lost });
}

#[test]
fn test_winner_exhausts_single_slot() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&config(&dir.path().join("raffle.db")), FixedRandom::always_win());

    assert_eq!(service.submit("u1", at(0)).unwrap(), Outcome::Won(ParticipantId::parse("u1").unwrap()));
    assert_eq!(service.submit("u2", at(2)).unwrap(), Outcome::SlotsExhausted);
}

#[test]
fn test_blank_identifier_is_rejected() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&config(&dir.path().join("raffle.db")), FixedRandom::always_win());

    let err = service.submit("", at(0)).unwrap_err();
    assert!(matches!(err, ClaimError::Validation(_)));
    assert_eq!(service.status(at(0)).unwrap().participants, 0);
}

#[test]
fn test_claim_after_deadline_is_closed() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&config(&dir.path().join("raffle.db")), FixedRandom::always_win());

    assert_eq!(service.submit("u3", at(HOUR_MS + 1_000)).unwrap(), Outcome::EventClosed);
    assert_eq!(service.status(at(HOUR_MS + 1_000)).unwrap().participants, 0);
}

#[test]
fn test_outcomes_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir.path().join("raffle.db"));

    {
        let service = open_service(&config, FixedRandom::always_win());
        service.submit("u1", at(0)).unwrap();
        service.submit("u2", at(1)).unwrap();
    }

    let reopened = open_service(&config, FixedRandom::always_win());
    assert_eq!(
        reopened.submit("u1", at(5)).unwrap(),
        Outcome::AlreadyWon(ParticipantId::parse("u1").unwrap())
    );
    assert_eq!(
        reopened.submit("u2", at(6)).unwrap(),
        Outcome::AlreadyParticipated { recorded: RecordedOutcome::SlotsExhausted }
    );
    assert_eq!(reopened.submit("u3", at(7)).unwrap(), Outcome::SlotsExhausted);
    assert_eq!(reopened.deadline(), at(HOUR_MS));
}

#[test]
fn test_independent_connections_share_one_slot() {
    const CONTENDERS: usize = 8;

    let dir = TempDir::new().unwrap();
    let config = LotteryConfig {
        // Every lost compare-and-set means another contender committed
        max_save_attempts: CONTENDERS as u32,
        store_timeout_ms: 10_000,
        ..config(&dir.path().join("raffle.db"))
    };

    // Create the record up front so contenders only race on claims
    drop(open_service(&config, FixedRandom::always_win()));

    let barrier = Arc::new(Barrier::new(CONTENDERS));
    let handles: Vec<_> = (0..CONTENDERS)
        .map(|i| {
            let config = config.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let service = open_service(&config, FixedRandom::always_win());
                barrier.wait();
                service.submit(&format!("contender-{i}"), at(10)).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_win()).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| **o == Outcome::SlotsExhausted).count(), CONTENDERS - 1);

    let status = open_service(&config, FixedRandom::always_win()).status(at(20)).unwrap();
    assert_eq!(status.participants, CONTENDERS);
    assert!(status.winner.is_some());
}

#[test]
fn test_seeded_draws_are_reproducible() {
    let run = |seed: u64| -> Vec<String> {
        let dir = TempDir::new().unwrap();
        let config = LotteryConfig {
            slot_count: 3,
            ..config(&dir.path().join("raffle.db"))
        };
        let store = SqliteStore::new(&config.database, DEFAULT_EVENT_KEY).unwrap();
        let ledger = ClaimLedger::new(store, SeededRandom::new(seed), config).unwrap();
        let service = ClaimService::open(ledger, ManualClock::new(at(0))).unwrap();

        (0..20)
            .map(|i| service.submit(&format!("user-{i}"), at(i)).unwrap().kind().to_string())
            .collect()
    };

    assert_eq!(run(42), run(42));
}

#[test]
fn test_short_store_timeout_is_honoured() {
    let dir = TempDir::new().unwrap();
    let config = LotteryConfig {
        store_timeout_ms: 50,
        ..config(&dir.path().join("raffle.db"))
    };

    assert_eq!(config.store_timeout(), Duration::from_millis(50));
    let service = open_service(&config, FixedRandom::always_lose());
    assert_eq!(service.submit("u1", at(0)).unwrap(), Outcome::Lost);
}
