// monobiome: palette and scheme generator.
//
// Usage: monobiome [--config FILE] [--log-level LEVEL] <palette|scheme|coverage> ...

mod cli;

use std::process;

use clap::Parser;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Install the stderr subscriber: `--log-level`, then `RUST_LOG`, then warn.
fn init_tracing(level: Option<Level>) {
    let filter = match level {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from_level(level).into()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    if let Err(e) = cli::run(cli) {
        eprintln!("monobiome: {e:#}");
        process::exit(1);
    }
}
