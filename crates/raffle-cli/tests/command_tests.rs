//! Command tests against a temporary database

use raffle_cli::cli::{InitArgs, SubmitArgs, WatchArgs};
use raffle_cli::commands;
use raffle_cli::config::OutputFormat;
use raffle_cli::{CliError, Config, Formatter};
use raffle_domain::{Clock, StateStore, SystemClock};
use raffle_ledger::{ClaimError, LotteryConfig};
use raffle_store::SqliteStore;
use tempfile::TempDir;

fn config(dir: &TempDir) -> LotteryConfig {
    LotteryConfig {
        database: dir.path().join("raffle.db"),
        ..LotteryConfig::generous()
    }
}

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

#[test]
fn test_init_creates_event() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let args = InitArgs {
        days: Some(2),
        deadline_ms: None,
        slots: Some(2),
    };
    commands::execute_init(args, &config, &quiet()).unwrap();

    let service = commands::open_service(&config).unwrap();
    let status = service.status_now().unwrap();
    assert!(status.open);
    assert_eq!(status.slot_count, 2);
    assert_eq!(status.countdown.days, 1);
}

#[test]
fn test_init_rejects_deadline_before_now() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let args = InitArgs {
        days: None,
        deadline_ms: Some(5),
        slots: None,
    };
    let result = commands::execute_init(args, &config, &quiet());
    assert!(matches!(result, Err(CliError::Claim(ClaimError::Config(_)))));

    // Nothing was created
    let store = SqliteStore::new(&config.database, config.event_key.as_str()).unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_submit_records_claims() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let service = commands::open_service(&config).unwrap();

    commands::execute_submit(SubmitArgs { uid: "u1".to_string() }, &service, &quiet()).unwrap();
    commands::execute_submit(SubmitArgs { uid: "u2".to_string() }, &service, &quiet()).unwrap();

    let status = service.status_now().unwrap();
    assert_eq!(status.participants, 2);
    assert_eq!(status.winner.map(|w| w.to_string()), Some("u1".to_string()));
}

#[test]
fn test_blank_submit_fails() {
    let dir = TempDir::new().unwrap();
    let service = commands::open_service(&config(&dir)).unwrap();

    let result = commands::execute_submit(SubmitArgs { uid: "  ".to_string() }, &service, &quiet());
    assert!(matches!(result, Err(CliError::Claim(_))));
}

#[tokio::test]
async fn test_watch_returns_once_closed() {
    let dir = TempDir::new().unwrap();
    let deadline = SystemClock.now().as_millis() + 1_500;
    let config = LotteryConfig {
        deadline_ms: Some(deadline),
        ..config(&dir)
    };
    let service = commands::open_service(&config).unwrap();

    commands::execute_watch(WatchArgs { interval_secs: 1 }, &service, &quiet())
        .await
        .unwrap();
    commands::execute_status(&service, &quiet()).unwrap();
}

#[tokio::test]
async fn test_watch_rejects_zero_interval() {
    let dir = TempDir::new().unwrap();
    let service = commands::open_service(&config(&dir)).unwrap();

    let result = commands::execute_watch(WatchArgs { interval_secs: 0 }, &service, &quiet()).await;
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[test]
fn test_default_config_loads_without_file() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.lottery, LotteryConfig::default());
}
