//! Logging infrastructure for diagram construction
//!
//! Structured logging through `tracing`. Every layout, emission and save
//! runs inside an info-level span; stage results are logged at debug and
//! per-item detail at trace. Logs go to stderr so stdout stays free for
//! JSON results.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chalkline::core::logging::init_logging;
//!
//! // Level and format from the environment, or info/compact
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Environment Variables
//!
//! - `CHALKLINE_LOG_LEVEL`: log level or filter directive (trace|debug|info|warn|error|off)
//! - `RUST_LOG`: standard filter directive, used when the above is unset
//! - `CHALKLINE_LOG_FORMAT`: compact|pretty|json
//!
//! # Filtering Logs
//!
//! ```bash
//! # Trace only the flowchart layout
//! RUST_LOG="info,chalkline::plugins::flowchart::layout=trace" chalkline generate --text "..." --output /tmp/d
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use super::{DiagramError, Result};

/// Environment variable holding the log level
pub const LOG_LEVEL_ENV: &str = "CHALKLINE_LOG_LEVEL";
/// Environment variable holding the log format
pub const LOG_FORMAT_ENV: &str = "CHALKLINE_LOG_FORMAT";

/// Output format of the stderr layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// Multi-line, with span enter/exit events
    Pretty,
    /// One JSON object per event, with span close timings
    Json,
}

impl FromStr for LogFormat {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(DiagramError::style(format!("Unknown log format: {}", s))),
        }
    }
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Pick the filter directive: argument, then `CHALKLINE_LOG_LEVEL`, then
/// `RUST_LOG`, then `info`
pub fn resolve_level(level: Option<&str>) -> String {
    level
        .map(|s| s.to_string())
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

/// Pick the format: argument, then `CHALKLINE_LOG_FORMAT`, then compact
pub fn resolve_format(format: Option<&str>) -> Result<LogFormat> {
    format
        .map(|s| s.to_string())
        .or_else(|| std::env::var(LOG_FORMAT_ENV).ok())
        .map(|s| s.parse())
        .unwrap_or(Ok(LogFormat::Compact))
}

/// Build the filter, falling back to `info` for an unparsable directive
pub fn build_filter(level: &str) -> EnvFilter {
    if level == "off" {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Layer type every format is erased to
type FormatLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer(format: LogFormat) -> FormatLayer {
    let base = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_level(true);
    match format {
        LogFormat::Compact => base.with_target(false).compact().boxed(),
        LogFormat::Pretty => base
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .pretty()
            .boxed(),
        LogFormat::Json => base
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .boxed(),
    }
}

/// Install the global subscriber for `level` and `format`
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(level: Option<&str>, format: Option<&str>) -> Result<()> {
    let filter = build_filter(&resolve_level(level));
    let format = resolve_format(format)?;

    Registry::default()
        .with(format_layer(format))
        .with(filter)
        .try_init()
        .map_err(|e| DiagramError::style(format!("logging already initialised: {}", e)))
}
