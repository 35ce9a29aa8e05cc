use crate::config::level::LogLevel;
use chrono::{DateTime, Local};
use std::fmt::{self, Write};
use std::panic::Location;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata};

const MESSAGE_FIELD: &str = "message";
// Fields added by `tracing-log` when bridging `log` records. They are already part of the
// normalized metadata.
const LOG_FIELDS_PREFIX: &str = "log.";

/// A single log record as seen by handlers and formatters.
#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) name: String,
    pub(crate) level: LogLevel,
    pub(crate) message: String,
    pub(crate) pathname: Option<String>,
    pub(crate) lineno: Option<u32>,
    pub(crate) module_path: Option<String>,
    pub(crate) func_name: Option<String>,
    pub(crate) created: DateTime<Local>,
    pub(crate) relative_created_ms: i64,
    pub(crate) thread_id: u64,
    pub(crate) thread_name: String,
}

impl Record {
    pub fn new(name: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        let thread = std::thread::current();
        Self {
            name: name.into(),
            level,
            message: message.into(),
            pathname: None,
            lineno: None,
            module_path: None,
            func_name: None,
            created: Local::now(),
            relative_created_ms: 0,
            thread_id: thread_number(&thread),
            thread_name: thread.name().unwrap_or("<unnamed>").to_string(),
        }
    }

    pub(crate) fn with_location(mut self, location: &Location<'_>) -> Self {
        self.pathname = Some(location.file().to_string());
        self.lineno = Some(location.line());
        self
    }

    /// Builds a record out of a `tracing` event, using `metadata` for the location (it may be
    /// the normalized metadata of a bridged `log` record).
    pub(crate) fn from_event(
        event: &Event<'_>,
        metadata: &Metadata<'_>,
        func_name: Option<&str>,
    ) -> Self {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut record = Self::new(
            logger_name(metadata.target()),
            LogLevel::from(*metadata.level()),
            visitor.finish(),
        );
        record.pathname = metadata.file().map(str::to_string);
        record.lineno = metadata.line();
        record.module_path = metadata.module_path().map(str::to_string);
        record.func_name = func_name.map(str::to_string);
        record
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Dotted logger name of a `tracing` target: `conv_lstm::train` is logger `conv_lstm.train`.
pub fn logger_name(target: &str) -> String {
    target.replace("::", ".")
}

fn thread_number(thread: &std::thread::Thread) -> u64 {
    // `ThreadId` only exposes its number through `Debug`, as `ThreadId(N)`.
    format!("{:?}", thread.id())
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or_default()
}

/// Collects the `message` field and appends the remaining fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if field.name().starts_with(LOG_FIELDS_PREFIX) {
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.message = value.to_string();
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }
}
