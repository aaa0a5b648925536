// Entrypoint for the console client.
// - Keeps `main` small: parse and validate arguments, set up logging, then
//   hand the configuration to the event loop.
// - Returns `anyhow::Result` so setup failures print a readable chain.

use clap::Parser;
use mctui_cli::{cli::Args, logging, runtime};

fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;

    // Held until exit so buffered log lines get flushed.
    let _guard = logging::init(config.log_file.as_deref())?;

    runtime::run(&config)
}
