//! Submit command implementation.

use crate::cli::SubmitArgs;
use crate::commands::Service;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the submit command.
///
/// Every business outcome (including a loss or a closed event) is printed
/// and counts as success; only errors make the command fail.
pub fn execute_submit(args: SubmitArgs, service: &Service, formatter: &Formatter) -> Result<()> {
    let outcome = service.submit_now(&args.uid)?;
    println!("{}", formatter.format_outcome(&outcome)?);
    Ok(())
}
