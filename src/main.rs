// SecureValues — Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (secret
// values are never passed to tracing), and dispatches to the command
// handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use secure_values::cli::{execute, Cli};

fn main() {
    // RUST_LOG=secure_values=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("secure_values=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
