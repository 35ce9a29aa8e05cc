use super::console::ConsoleProvider;
use super::format::RecordFormat;
use super::record::Record;
use super::sink::{LogFile, RotatingFile, Sink};
use super::style::RecordStyle;
use crate::config::error::LoggingConfigError;
use crate::config::handler::{ConsoleStream, FileMode, HandlerKind};
use crate::config::level::LogLevel;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Lets through records of the named logger and of its descendants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NameFilter {
    name: String,
}

impl NameFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn accepts(&self, logger: &str) -> bool {
        self.name.is_empty()
            || logger == self.name
            || logger
                .strip_prefix(self.name.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// What a handler writes to, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerTarget {
    Console(ConsoleStream),
    File(PathBuf),
    Null,
}

/// Snapshot of a handler attached to a logger.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerInfo {
    pub name: Option<String>,
    pub level: LogLevel,
    pub target: HandlerTarget,
    pub colored: bool,
}

/// Formats records and writes them to a [Sink].
#[derive(Debug)]
pub(crate) struct Handler {
    name: Option<String>,
    level: AtomicU32,
    format: RecordFormat,
    style: Arc<dyn RecordStyle>,
    filters: Vec<NameFilter>,
    target: HandlerTarget,
    sink: Mutex<Sink>,
}

impl Handler {
    pub(crate) fn new(
        name: Option<String>,
        level: LogLevel,
        format: RecordFormat,
        style: Arc<dyn RecordStyle>,
        filters: Vec<NameFilter>,
        target: HandlerTarget,
        sink: Sink,
    ) -> Self {
        Self {
            name,
            level: AtomicU32::new(level.number()),
            format,
            style,
            filters,
            target,
            sink: Mutex::new(sink),
        }
    }

    /// Console handler writing to `stream`.
    pub(crate) fn console(
        stream: ConsoleStream,
        console: Arc<dyn ConsoleProvider>,
        level: LogLevel,
        format: RecordFormat,
        style: Arc<dyn RecordStyle>,
    ) -> Self {
        Self::new(
            None,
            level,
            format,
            style,
            Vec::new(),
            HandlerTarget::Console(stream),
            Sink::Console { stream, console },
        )
    }

    /// Builds the sink described by `kind`, opening files unless delayed.
    pub(crate) fn sink_for(
        name: &str,
        kind: &HandlerKind,
        console: &Arc<dyn ConsoleProvider>,
    ) -> Result<(HandlerTarget, Sink), LoggingConfigError> {
        let io_error = |source| LoggingConfigError::Handler {
            handler: name.to_string(),
            source,
        };
        Ok(match kind {
            HandlerKind::Stream { stream } => (
                HandlerTarget::Console(*stream),
                Sink::Console {
                    stream: *stream,
                    console: console.clone(),
                },
            ),
            HandlerKind::StandardError => (
                HandlerTarget::Console(ConsoleStream::Stderr),
                Sink::Console {
                    stream: ConsoleStream::Stderr,
                    console: console.clone(),
                },
            ),
            HandlerKind::File {
                filename,
                mode,
                delay,
            } => (
                HandlerTarget::File(filename.clone()),
                Sink::File(LogFile::new(filename.clone(), *mode, *delay).map_err(io_error)?),
            ),
            HandlerKind::RotatingFile {
                filename,
                mode,
                max_bytes,
                backup_count,
                delay,
            } => {
                let sink = if *max_bytes == 0 || *backup_count == 0 {
                    // Any size limit forces append mode.
                    let mode = if *max_bytes > 0 { FileMode::Append } else { *mode };
                    Sink::File(LogFile::new(filename.clone(), mode, *delay).map_err(io_error)?)
                } else {
                    Sink::RotatingFile(
                        RotatingFile::new(filename.clone(), *max_bytes, *backup_count, *delay)
                            .map_err(io_error)?,
                    )
                };
                (HandlerTarget::File(filename.clone()), sink)
            }
            HandlerKind::TimedRotatingFile {
                filename,
                when,
                interval,
                backup_count,
            } => (
                HandlerTarget::File(filename.clone()),
                Sink::TimedRotatingFile(timed_appender(
                    name,
                    filename,
                    when,
                    *interval,
                    *backup_count,
                )?),
            ),
            HandlerKind::Null => (HandlerTarget::Null, Sink::Null),
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn level(&self) -> LogLevel {
        LogLevel::from_number(self.level.load(Ordering::Relaxed))
    }

    pub(crate) fn set_level(&self, level: LogLevel) {
        self.level.store(level.number(), Ordering::Relaxed);
    }

    pub(crate) fn is_console(&self) -> bool {
        matches!(self.target, HandlerTarget::Console(_))
    }

    pub(crate) fn info(&self) -> HandlerInfo {
        HandlerInfo {
            name: self.name.clone(),
            level: self.level(),
            target: self.target.clone(),
            colored: self.style.is_colored(),
        }
    }

    /// Emits `record` when it passes the handler level and filters.
    pub(crate) fn handle(&self, record: &Record) {
        if record.level < self.level() {
            return;
        }
        if !self.filters.iter().all(|filter| filter.accepts(&record.name)) {
            return;
        }
        let line = self.format.render(record, self.style.as_ref());
        let result = match self.sink.lock() {
            Ok(mut sink) => sink.emit(&line),
            Err(poisoned) => poisoned.into_inner().emit(&line),
        };
        if let Err(err) = result {
            // Reporting through logging could recurse into this handler.
            eprintln!(
                "--- Logging error in handler `{}`: {err}",
                self.name.as_deref().unwrap_or("<unnamed>")
            );
        }
    }
}

/// `tracing-appender` names the active file `<filename>.<date>`, so a timed rotating
/// handler never writes to `filename` itself. `backup_count` caps the dated files kept.
fn timed_appender(
    name: &str,
    filename: &Path,
    when: &str,
    interval: u32,
    backup_count: usize,
) -> Result<RollingFileAppender, LoggingConfigError> {
    let unsupported = || LoggingConfigError::UnsupportedRotation {
        handler: name.to_string(),
        when: when.to_string(),
        interval,
    };
    if interval != 1 {
        return Err(unsupported());
    }
    let rotation = match when.to_ascii_uppercase().as_str() {
        "M" => Rotation::MINUTELY,
        "H" => Rotation::HOURLY,
        "D" | "MIDNIGHT" => Rotation::DAILY,
        _ => return Err(unsupported()),
    };

    let invalid_path = || LoggingConfigError::InvalidFilePath {
        handler: name.to_string(),
        path: filename.to_path_buf(),
    };
    let file_name = filename
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(invalid_path)?;
    let directory = filename
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name);
    if backup_count > 0 {
        builder = builder.max_log_files(backup_count);
    }
    builder.build(directory).map_err(|err| LoggingConfigError::Handler {
        handler: name.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::console::test::CapturedConsole;
    use crate::logging::style::PlainStyle;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("", "anything", true)]
    #[case("conv_lstm", "conv_lstm", true)]
    #[case("conv_lstm", "conv_lstm.train", true)]
    #[case("conv_lstm", "conv_lstm_data", false)]
    #[case("conv_lstm.train", "conv_lstm", false)]
    fn name_filter(#[case] filter: &str, #[case] logger: &str, #[case] accepted: bool) {
        assert_eq!(accepted, NameFilter::new(filter).accepts(logger));
    }

    fn console_handler(console: &CapturedConsole, level: LogLevel) -> Handler {
        Handler::console(
            ConsoleStream::Stdout,
            Arc::new(console.clone()),
            level,
            RecordFormat::default(),
            Arc::new(PlainStyle),
        )
    }

    #[test]
    fn handler_applies_its_level() {
        let console = CapturedConsole::default();
        let handler = console_handler(&console, LogLevel::WARNING);

        handler.handle(&Record::new("conv_lstm", LogLevel::INFO, "dropped"));
        handler.handle(&Record::new("conv_lstm", LogLevel::ERROR, "kept"));

        assert_eq!(vec!["kept"], console.lines(ConsoleStream::Stdout));
    }

    #[test]
    fn handler_level_can_change() {
        let console = CapturedConsole::default();
        let handler = console_handler(&console, LogLevel::WARNING);
        handler.set_level(LogLevel::DEBUG);

        handler.handle(&Record::new("conv_lstm", LogLevel::DEBUG, "kept"));

        assert_eq!(LogLevel::DEBUG, handler.info().level);
        assert_eq!(vec!["kept"], console.lines(ConsoleStream::Stdout));
    }

    #[test]
    fn handler_applies_its_filters() {
        let console = CapturedConsole::default();
        let handler = Handler::new(
            Some("filtered".to_string()),
            LogLevel::NOTSET,
            RecordFormat::default(),
            Arc::new(PlainStyle),
            vec![NameFilter::new("conv_lstm.data")],
            HandlerTarget::Console(ConsoleStream::Stderr),
            Sink::Console {
                stream: ConsoleStream::Stderr,
                console: Arc::new(console.clone()),
            },
        );

        handler.handle(&Record::new("conv_lstm.train", LogLevel::INFO, "dropped"));
        handler.handle(&Record::new("conv_lstm.data.loader", LogLevel::INFO, "kept"));

        assert_eq!(vec!["kept"], console.lines(ConsoleStream::Stderr));
    }

    #[test]
    fn unsupported_rotation_is_rejected() {
        let console: Arc<dyn ConsoleProvider> = Arc::new(CapturedConsole::default());
        let kind = HandlerKind::TimedRotatingFile {
            filename: PathBuf::from("/tmp/run.log"),
            when: "W0".to_string(),
            interval: 1,
            backup_count: 0,
        };

        let result = Handler::sink_for("timed", &kind, &console);

        assert_matches!(result, Err(LoggingConfigError::UnsupportedRotation { handler, .. }) => {
            assert_eq!("timed", handler);
        });
    }

    #[test]
    fn timed_rotating_file_writes_under_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let console: Arc<dyn ConsoleProvider> = Arc::new(CapturedConsole::default());
        let kind = HandlerKind::TimedRotatingFile {
            filename: dir.path().join("hourly.log"),
            when: "h".to_string(),
            interval: 1,
            backup_count: 3,
        };

        let (target, mut sink) = Handler::sink_for("timed", &kind, &console).unwrap();
        sink.emit("rolled").unwrap();

        assert_eq!(HandlerTarget::File(dir.path().join("hourly.log")), target);
        let written: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(1, written.len());
        assert!(written[0].starts_with("hourly.log"));
    }

    #[rstest]
    #[case::no_size_limit(0, 3)]
    #[case::no_backups(15, 0)]
    fn rotating_handler_without_rollover_keeps_every_record(
        #[case] max_bytes: u64,
        #[case] backup_count: u32,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let console: Arc<dyn ConsoleProvider> = Arc::new(CapturedConsole::default());
        let path = dir.path().join("info.log");
        let kind = HandlerKind::RotatingFile {
            filename: path.clone(),
            mode: FileMode::Append,
            max_bytes,
            backup_count,
            delay: false,
        };

        let (_, mut sink) = Handler::sink_for("rotating", &kind, &console).unwrap();
        for line in ["record-01", "record-02", "record-03"] {
            sink.emit(line).unwrap();
        }

        assert_eq!(
            "record-01\nrecord-02\nrecord-03\n",
            std::fs::read_to_string(&path).unwrap()
        );
        assert!(!dir.path().join("info.log.1").exists());
    }

    #[test]
    fn size_limit_forces_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let console: Arc<dyn ConsoleProvider> = Arc::new(CapturedConsole::default());
        let path = dir.path().join("info.log");
        std::fs::write(&path, "previous run\n").unwrap();
        let kind = HandlerKind::RotatingFile {
            filename: path.clone(),
            mode: FileMode::Truncate,
            max_bytes: 1024,
            backup_count: 0,
            delay: false,
        };

        let (_, mut sink) = Handler::sink_for("rotating", &kind, &console).unwrap();
        sink.emit("this run").unwrap();

        assert_eq!(
            "previous run\nthis run\n",
            std::fs::read_to_string(&path).unwrap()
        );
    }

    #[test]
    fn unopenable_file_is_a_handler_error() {
        let dir = tempfile::tempdir().unwrap();
        let console: Arc<dyn ConsoleProvider> = Arc::new(CapturedConsole::default());
        // A directory cannot be opened as a log file.
        let kind = HandlerKind::File {
            filename: dir.path().to_path_buf(),
            mode: Default::default(),
            delay: false,
        };

        let result = Handler::sink_for("file", &kind, &console);

        assert_matches!(result, Err(LoggingConfigError::Handler { handler, .. }) => {
            assert_eq!("file", handler);
        });
    }
}
