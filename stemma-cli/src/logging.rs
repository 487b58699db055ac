//! Tracing setup for the stemma binary.
//!
//! One global subscriber, installed before the pipeline starts: an
//! `EnvFilter` honouring `RUST_LOG`, a fmt layer writing to stderr, and a
//! `log`-facade bridge so dependencies logging through either API land in
//! the same stream. `STEMMA_LOG_FORMAT=json` switches the fmt layer to
//! newline-delimited JSON for machine consumption.

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const FORMAT_VAR: &str = "STEMMA_LOG_FORMAT";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Output format of the event layer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Human-readable single-line events.
    #[default]
    Human,
    /// Newline-delimited JSON with span context.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::UnsupportedFormat {
                provided: raw.trim().to_owned(),
            }),
        }
    }
}

/// Errors raised while setting up structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `STEMMA_LOG_FORMAT` held a value other than `human` or `json`.
    #[error("`STEMMA_LOG_FORMAT` must be `human` or `json`, not `{provided}`")]
    UnsupportedFormat {
        /// The rejected value.
        provided: String,
    },
    /// `STEMMA_LOG_FORMAT` was not valid UTF-8.
    #[error("`STEMMA_LOG_FORMAT` is not valid UTF-8")]
    NotUnicode,
}

/// Installs the global subscriber once; later calls are no-ops.
///
/// The filter comes from `RUST_LOG` (default `info`) and the format from
/// `STEMMA_LOG_FORMAT`. Events go to stderr, leaving stdout to the run
/// summary. When another subscriber already owns the global default, the
/// existing configuration is kept.
///
/// # Errors
/// Returns [`LoggingError`] when `STEMMA_LOG_FORMAT` holds an unsupported
/// or non-UTF-8 value.
pub fn init_logging() -> Result<(), LoggingError> {
    let format = format_from_env()?;
    INSTALLED.get_or_init(|| {
        if let Err(err) = try_install(format) {
            eprintln!("keeping the existing tracing subscriber: {err}");
        }
    });
    Ok(())
}

fn format_from_env() -> Result<LogFormat, LoggingError> {
    match env::var(FORMAT_VAR) {
        Ok(raw) => raw.parse(),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(env::VarError::NotUnicode(_)) => Err(LoggingError::NotUnicode),
    }
}

fn try_install(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let events = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let events = match format {
        LogFormat::Json => events
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Human => events.boxed(),
    };

    // Best-effort: a second bridge registration means some other logger got
    // there first, and its choice stands.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(filter)
        .with(events)
        .try_init()
}
