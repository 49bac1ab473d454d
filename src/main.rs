use std::process::ExitCode;

use clap::Parser;

use harness_admin::cli::{self, Cli};
use harness_admin::logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose);

    match cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}
