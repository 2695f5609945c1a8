//! Init command implementation.

use crate::cli::InitArgs;
use crate::commands::open_service;
use crate::error::Result;
use crate::output::Formatter;
use raffle_domain::StateStore;
use raffle_ledger::LotteryConfig;
use raffle_store::SqliteStore;

/// Execute the init command.
///
/// Window and slot overrides only apply when the event is created; an
/// existing event keeps what was stored.
pub fn execute_init(args: InitArgs, config: &LotteryConfig, formatter: &Formatter) -> Result<()> {
    let config = apply_overrides(&args, config)?;

    let existed = {
        let store = SqliteStore::with_timeout(&config.database, config.event_key.as_str(), config.store_timeout())?;
        store.load()?.is_some()
    };

    let service = open_service(&config)?;

    if !formatter.is_plain() {
        if existed {
            println!("{}", formatter.warning(&format!("Event '{}' already exists; settings unchanged", config.event_key)));
        } else {
            println!("{}", formatter.success(&format!("Event '{}' created in {}", config.event_key, config.database.display())));
        }
    }

    println!("{}", formatter.format_status(&service.status_now()?)?);
    Ok(())
}

/// Apply command-line overrides to the loaded configuration.
fn apply_overrides(args: &InitArgs, config: &LotteryConfig) -> Result<LotteryConfig> {
    let mut config = config.clone();

    if let Some(days) = args.days {
        config.duration_days = days;
        config.deadline_ms = None;
    }
    if let Some(deadline_ms) = args.deadline_ms {
        config.deadline_ms = Some(deadline_ms);
    }
    if let Some(slots) = args.slots {
        config.slot_count = slots;
    }

    config.validate()?;
    Ok(config)
}
