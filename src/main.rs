use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use gitmeta::cli::{self, Cli};
use gitmeta::ui::output;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // RUST_LOG wins; otherwise --debug raises the default level
    let default_level = if cli.debug { "gitmeta=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
