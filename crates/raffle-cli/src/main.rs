//! Raffle CLI - Command-line interface for running a raffle event.

use clap::Parser;
use raffle_cli::commands;
use raffle_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so command output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> raffle_cli::Result<()> {
    // Load config
    let mut config = Config::load(cli.config.as_deref())?;

    // Override database if specified
    if let Some(database) = cli.database {
        config.lottery.database = database;
    }

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Init(args) => {
            commands::execute_init(args, &config.lottery, &formatter)?;
        }
        cmd => {
            let service = commands::open_service(&config.lottery)?;

            match cmd {
                Command::Submit(args) => commands::execute_submit(args, &service, &formatter)?,
                Command::Status => commands::execute_status(&service, &formatter)?,
                Command::Watch(args) => commands::execute_watch(args, &service, &formatter).await?,
                Command::Init(_) => unreachable!(),
            }
        }
    }

    Ok(())
}
