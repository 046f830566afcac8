//! Logger initialization.
//!
//! Plain output is colored for terminals; JSON output writes one object per
//! line for log shippers.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies whose chatter is capped regardless of the requested level.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("sqlx", LevelFilter::Info),
    // one line per statement otherwise
    ("sqlx::query", LevelFilter::Warn),
];

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` from `RUST_LOG`; the explicit `level` overrides it
/// for this crate.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// ```bash
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=rawrepo_record_service::dump=debug,sqlx=warn my-service
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in QUIET_MODULES {
        builder.filter_module(module, (*cap).min(level));
    }
    builder.filter_module(env!("CARGO_PKG_NAME"), level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };

    // try_init: tests install loggers repeatedly
    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

fn write_json(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let line = serde_json::json!({
        "ts": chrono::Utc::now().timestamp_millis(),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    });
    writeln!(buf, "{line}")
}

fn write_plain(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "{} {} [{}] {}",
        chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
        record.target().cyan(),
        colored_level(record.level()),
        record.args()
    )
}

fn colored_level(level: Level) -> ColoredString {
    let text = level.as_str();
    match level {
        Level::Error => text.red().bold(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.purple(),
    }
}
