use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use acc_driver::DriverError;

mod commands;

use commands::collect::CollectArgs;

#[derive(Parser)]
#[command(name = "acc")]
#[command(about = "Journal parity acceptance harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the variant matrix against the engine and print the digest report
    Collect(CollectArgs),

    /// Canonicalize + digest one journal pair
    Digest {
        /// Events journal (first two lines are excluded from the digest)
        #[arg(long)]
        events: PathBuf,

        /// Trades journal; absent means an empty payload
        #[arg(long)]
        trades: Option<PathBuf>,
    },

    /// Compare the journals of two run directories
    Parity {
        /// First run directory
        a: PathBuf,

        /// Second run directory
        b: PathBuf,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    let res: Result<u8, DriverError> = match cli.cmd {
        Commands::Collect(args) => commands::collect::collect(args),
        Commands::Digest { events, trades } => commands::digest::digest(&events, trades.as_deref()),
        Commands::Parity { a, b } => commands::parity::parity(&a, &b),
    };

    match res {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("acc failed exit_code={}", e.exit_code());
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Logs go to stderr; stdout carries only the JSON output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
