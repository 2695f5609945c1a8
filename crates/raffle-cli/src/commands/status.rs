//! Status command implementation.

use crate::commands::Service;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the status command.
pub fn execute_status(service: &Service, formatter: &Formatter) -> Result<()> {
    let status = service.status_now()?;
    println!("{}", formatter.format_status(&status)?);
    Ok(())
}
