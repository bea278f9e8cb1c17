//! Logger construction.
//!
//! Local runs get compact human-readable lines. Everywhere else events are
//! written as one JSON object per line using the Cloud Logging structured
//! payload keys (`severity`, `timestamp`, `message`).

use std::fmt;
use std::io::IsTerminal;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{warn, Event, Level, Subscriber};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

use crate::config::{is_local, ENVVAR_LOG_LEVEL};
use crate::error::Error;
use crate::Result;

/// Log format enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text format.
    Text,
    /// Cloud Logging JSON format.
    Json,
}

impl LogFormat {
    /// Format used for the given runtime environment.
    pub fn for_env(env: Option<&str>) -> Self {
        if is_local(env) {
            Self::Text
        } else {
            Self::Json
        }
    }
}

/// Parse a log level name. An unset or blank value means `INFO`.
pub fn parse_log_level(text: Option<&str>) -> Result<Level> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(Level::INFO);
    };

    match text.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::UnknownLogLevel(text.to_string())),
    }
}

/// Log that `LOG_LEVEL` could not be parsed and `level` is used instead.
pub fn warn_level_fallback(err: &Error, level: Level) {
    let detail = format!(
        "failed to parse {} envvar, using log level {}, err: {}",
        ENVVAR_LOG_LEVEL, level, err
    );
    warn!(error = %detail, "Failed to parse log level envvar");
}

/// Filter at `level`, overridden by `directives` in `RUST_LOG` syntax when given.
pub fn level_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_logging(format: LogFormat, level: Level) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = level_filter(level, directives.as_deref());

    let subscriber = build_subscriber(format, filter, std::io::stderr);
    tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::Logging(e.to_string()))
}

/// Build a subscriber for `format` writing through `writer`.
pub fn build_subscriber<W>(format: LogFormat, filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoLocal::new("%-I:%M%p".to_string()))
            .compact()
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .event_format(CloudLoggingFormat)
            .with_filter(filter)
            .boxed(),
    };

    Registry::default().with(layer)
}

/// Event formatter emitting Cloud Logging structured JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudLoggingFormat;

impl<S, N> FormatEvent<S, N> for CloudLoggingFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, _ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let mut entry = Map::new();
        entry.insert("severity".into(), Value::from(severity(*metadata.level())));
        entry.insert(
            "timestamp".into(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        entry.insert("message".into(), Value::from(visitor.message.unwrap_or_default()));

        if let Some(file) = metadata.file() {
            let mut location = Map::new();
            location.insert("file".into(), Value::from(file));
            if let Some(line) = metadata.line() {
                location.insert("line".into(), Value::from(line.to_string()));
            }
            location.insert("function".into(), Value::from(metadata.target()));
            entry.insert("logging.googleapis.com/sourceLocation".into(), Value::Object(location));
        }

        for (key, value) in visitor.fields {
            entry.insert(key, value);
        }

        let line = serde_json::to_string(&Value::Object(entry)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Map a tracing level to a Cloud Logging `LogSeverity`.
pub fn severity(level: Level) -> &'static str {
    match level {
        Level::TRACE | Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Vec<(String, Value)>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            // Errors are grouped so log queries can match on error.message.
            "error" => {
                let message = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                let mut group = Map::new();
                group.insert("message".into(), Value::from(message));
                self.fields.push(("error".into(), Value::Object(group)));
            }
            // Keep event fields from replacing the top-level entry keys.
            name if RESERVED_KEYS.contains(&name) => self.fields.push((format!("fields.{}", name), value)),
            name => self.fields.push((name.to_string(), value)),
        }
    }
}

const RESERVED_KEYS: [&str; 3] = ["severity", "timestamp", "logging.googleapis.com/sourceLocation"];

impl Visit for JsonVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{:?}", value)));
    }
}
