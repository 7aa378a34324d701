//! # bo
//!
//! Command-line option handlers over an opaque persistence handle.
//!
//! Each option is an [`options::OptionHandler`]: it owns an
//! [`options::OptionDefinition`] (short flag, long flag, whether it takes an
//! argument, help text) and knows how to `execute` given the full argument
//! vector and a database handle. An [`options::OptionRegistry`] turns the
//! definitions into a `clap` command and dispatches a command line.
//!
//! The `bo` binary wires a set of handlers to a PostgreSQL entry store.
//!
//! ## Example
//!
//! ```
//! use bo_cli::options::OptionDefinition;
//!
//! let help = OptionDefinition::new("h", "help", false, "Show help")?;
//! assert_eq!(help.long(), "help");
//! assert!(OptionDefinition::new("", "", false, "nothing").is_err());
//! # Ok::<(), bo_cli::error::AppError>(())
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod options;

use config::Config;
use error::{AppError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging from the configured filter.
///
/// Console output goes to stderr so it never mixes with option output. When
/// `log_dir` is set, JSON lines are also written to a daily rolling file; the
/// returned guard must be held until exit so buffered lines get flushed.
pub fn setup_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bo.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}
