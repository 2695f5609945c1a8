//! Background countdown ticker

use crate::{ClaimError, ClaimService, StatusSnapshot};
use raffle_domain::{Clock, RandomSource, StateStore};
use std::fmt::Display;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::{interval, Duration};

/// Ticks at a fixed interval and reports the event status on each tick
///
/// Stops on its own once the event closes.
///
/// # Examples
///
/// ```no_run
/// use raffle_domain::SystemClock;
/// use raffle_ledger::{ClaimLedger, ClaimService, CountdownWorker, LotteryConfig, ThreadRandom};
/// use raffle_store::SqliteStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteStore::new("raffle.db", "lottery_data")?;
///     let ledger = ClaimLedger::new(store, ThreadRandom, LotteryConfig::default())?;
///     let service = ClaimService::open(ledger, SystemClock)?;
///
///     // Runs until the deadline or Ctrl+C
///     CountdownWorker::default()
///         .run(&service, |status| println!("{}", status.countdown))
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CountdownWorker {
    interval: Duration,
}

impl Default for CountdownWorker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl CountdownWorker {
    /// Create a worker ticking every `interval` (at least one millisecond)
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Tick interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until the event closes or a shutdown signal (Ctrl+C) arrives
    ///
    /// `on_tick` receives every snapshot, including the final one. The last
    /// snapshot taken is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while reading the status.
    pub async fn run<S, R, C, F>(&self, service: &ClaimService<S, R, C>, mut on_tick: F) -> Result<StatusSnapshot, ClaimError>
    where
        S: StateStore,
        S::Error: Display,
        R: RandomSource,
        C: Clock,
        F: FnMut(&StatusSnapshot),
    {
        let mut ticker = interval(self.interval);
        let mut last = read_status(service)?;

        tracing::info!("Countdown started (interval: {:?}, deadline: {})", self.interval, service.deadline());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    last = read_status(service)?;
                    on_tick(&last);

                    if !last.open {
                        tracing::info!("Event closed, stopping countdown");
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping countdown");
                    break;
                }
            }
        }

        Ok(last)
    }

    /// Run for at most `ticks` ticks, stopping early if the event closes
    pub async fn run_ticks<S, R, C, F>(
        &self,
        service: &ClaimService<S, R, C>,
        ticks: usize,
        mut on_tick: F,
    ) -> Result<StatusSnapshot, ClaimError>
    where
        S: StateStore,
        S::Error: Display,
        R: RandomSource,
        C: Clock,
        F: FnMut(&StatusSnapshot),
    {
        let mut ticker = interval(self.interval);
        let mut last = read_status(service)?;

        for tick in 0..ticks {
            ticker.tick().await;
            last = read_status(service)?;
            on_tick(&last);

            tracing::debug!("Countdown tick {}/{}: {}", tick + 1, ticks, last.countdown);

            if !last.open {
                break;
            }
        }

        Ok(last)
    }
}

/// Take a status snapshot without stalling the runtime's other tasks
///
/// Reading the status goes through the store, which may block on disk I/O. On
/// a multi-threaded runtime the read moves off the async worker with
/// `block_in_place`; a current-thread runtime cannot do that, so it reads inline.
fn read_status<S, R, C>(service: &ClaimService<S, R, C>) -> Result<StatusSnapshot, ClaimError>
where
    S: StateStore,
    S::Error: Display,
    R: RandomSource,
    C: Clock,
{
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| service.status_now()),
        _ => service.status_now(),
    }
}
