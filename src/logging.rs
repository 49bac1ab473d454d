use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn stderr_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "harness_admin=debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(feature = "debug-log")]
mod inner {
    use super::*;
    use std::fs;
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_subscriber::{fmt, prelude::*};

    pub fn init(verbose: bool) -> Option<(PathBuf, WorkerGuard)> {
        let log_path = PathBuf::from("harness-admin-debug.log");

        let file = match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file: {e}");
                return None;
            }
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_filter(stderr_filter(verbose)),
            );

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Failed to set tracing subscriber");
            return None;
        }

        tracing::info!("Debug logging initialized");

        Some((log_path, guard))
    }
}

#[cfg(not(feature = "debug-log"))]
mod inner {
    use super::*;

    pub fn init(verbose: bool) -> Option<(PathBuf, ())> {
        let subscriber = tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter(stderr_filter(verbose))
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Failed to set tracing subscriber");
        }
        None
    }
}

pub use inner::*;
