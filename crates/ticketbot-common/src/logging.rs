//! Structured logging infrastructure for TicketBot.
//!
//! Logging is initialised once, at process start, from a [`LoggingConfig`].
//! When no configuration is available the binary falls back to
//! [`LoggingConfig::default()`]: level `info`, pretty output on stdout and no
//! file sink.

use crate::{Result, TicketBotError};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Console output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, colored output.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
}

impl FromStr for LogFormat {
    type Err = TicketBotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(TicketBotError::InvalidConfig {
                variable: "LOG_FORMAT".to_string(),
                reason: format!("expected `pretty` or `compact`, got `{other}`"),
            }),
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (e.g. "info", "ticketbot_commands=debug").
    pub level: String,
    /// Console output style.
    pub format: LogFormat,
    /// Directory for the daily rolling log file. `None` disables the file sink.
    pub directory: Option<PathBuf>,
    /// File name prefix inside `directory`.
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
            file_prefix: "ticketbot.log".to_string(),
        }
    }
}

/// Keeps the non-blocking file writer alive. Dropping it flushes pending lines.
#[derive(Debug)]
#[must_use = "dropping the guard stops the file sink"]
pub struct LogGuard {
    file: Option<WorkerGuard>,
}

impl LogGuard {
    /// Whether a file sink is attached.
    pub const fn has_file_sink(&self) -> bool {
        self.file.is_some()
    }
}

/// Whether [`init_logging`] already succeeded in this process.
pub fn is_initialized() -> bool {
    INITIALIZED.get().is_some()
}

/// Initialize the global tracing subscriber.
///
/// Fails instead of panicking when called a second time.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    if is_initialized() {
        return Err(TicketBotError::Logging(
            "logging is already initialized".to_string(),
        ));
    }

    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let console = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    let (file, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| TicketBotError::Logging(e.to_string()))?;

    let _ = INITIALIZED.set(());
    Ok(LogGuard { file: guard })
}
