//! Command implementations.

pub mod init;
pub mod status;
pub mod submit;
pub mod watch;

pub use self::init::execute_init;
pub use self::status::execute_status;
pub use self::submit::execute_submit;
pub use self::watch::execute_watch;

use crate::error::Result;
use raffle_domain::SystemClock;
use raffle_ledger::{ClaimLedger, ClaimService, LotteryConfig, ThreadRandom};
use raffle_store::SqliteStore;

/// The service every command runs against.
pub type Service = ClaimService<SqliteStore, ThreadRandom, SystemClock>;

/// Open the configured database and the event stored in it.
///
/// The event is created with the configured window if it does not exist.
pub fn open_service(config: &LotteryConfig) -> Result<Service> {
    tracing::debug!(
        "Opening event '{}' in {}",
        config.event_key,
        config.database.display()
    );
    let store = SqliteStore::with_timeout(&config.database, config.event_key.as_str(), config.store_timeout())?;
    let ledger = ClaimLedger::new(store, ThreadRandom, config.clone())?;
    Ok(ClaimService::open(ledger, SystemClock)?)
}
