//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::commands::Service;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use raffle_ledger::CountdownWorker;
use std::time::Duration;

/// Execute the watch command.
///
/// Prints one line per tick until the event closes or Ctrl+C is pressed.
pub async fn execute_watch(args: WatchArgs, service: &Service, formatter: &Formatter) -> Result<()> {
    if args.interval_secs == 0 {
        return Err(CliError::InvalidInput("Interval must be at least one second".to_string()));
    }

    let worker = CountdownWorker::new(Duration::from_secs(args.interval_secs));
    let mut render_error = None;

    let last = worker
        .run(service, |status| match formatter.format_tick(status) {
            Ok(line) => println!("{}", line),
            Err(e) => render_error = Some(e),
        })
        .await?;

    if let Some(e) = render_error {
        return Err(e);
    }

    if !formatter.is_plain() {
        println!("{}", formatter.format_status(&last)?);
    }
    Ok(())
}
