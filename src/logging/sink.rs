use super::console::ConsoleProvider;
use crate::config::handler::{ConsoleStream, FileMode};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender as SizeRollingAppender;
use log4rs::append::Append;
use log4rs::encode::pattern::PatternEncoder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::rolling::RollingFileAppender;

/// Where a handler writes its formatted records.
pub(crate) enum Sink {
    Console {
        stream: ConsoleStream,
        console: Arc<dyn ConsoleProvider>,
    },
    File(LogFile),
    RotatingFile(RotatingFile),
    TimedRotatingFile(RollingFileAppender),
    Null,
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Console { stream, .. } => format!("Console({stream:?})"),
            Self::File(file) => format!("File({})", file.path().display()),
            Self::RotatingFile(file) => format!("RotatingFile({})", file.path().display()),
            Self::TimedRotatingFile(_) => "TimedRotatingFile".to_string(),
            Self::Null => "Null".to_string(),
        };
        f.write_str(&kind)
    }
}

impl Sink {
    /// Writes one line, appending the terminator.
    pub(crate) fn emit(&mut self, line: &str) -> io::Result<()> {
        match self {
            Self::Console { stream, console } => {
                let mut writer = console.writer(*stream);
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()
            }
            Self::File(file) => file.write_line(line),
            Self::RotatingFile(file) => file.write_line(line),
            Self::TimedRotatingFile(appender) => {
                appender.write_all(format!("{line}\n").as_bytes())?;
                appender.flush()
            }
            Self::Null => Ok(()),
        }
    }
}

/// Plain log file, optionally opened on the first record.
pub(crate) struct LogFile {
    path: PathBuf,
    mode: FileMode,
    file: Option<File>,
}

impl LogFile {
    pub(crate) fn new(path: PathBuf, mode: FileMode, delay: bool) -> io::Result<Self> {
        let mut log_file = Self {
            path,
            mode,
            file: None,
        };
        if !delay {
            log_file.open()?;
        }
        Ok(log_file)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut options = OpenOptions::new();
            options.create(true);
            match self.mode {
                FileMode::Append => options.append(true),
                FileMode::Truncate => options.write(true).truncate(true),
            };
            self.file = Some(options.open(&self.path)?);
        }
        // Set right above when missing.
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file is not open"))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let file = self.open()?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()
    }
}

/// Log file rolled over once it grows past `max_bytes`, keeping `backup_count` backups
/// named `<file>.1` (newest) to `<file>.<backup_count>` (oldest).
///
/// Always appends. A zero `max_bytes` or `backup_count` never rolls over, so such
/// handlers are plain [LogFile]s instead.
pub(crate) struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    appender: Option<SizeRollingAppender>,
}

impl RotatingFile {
    pub(crate) fn new(
        path: PathBuf,
        max_bytes: u64,
        backup_count: u32,
        delay: bool,
    ) -> io::Result<Self> {
        let mut rotating = Self {
            path,
            max_bytes,
            backup_count,
            appender: None,
        };
        if !delay {
            rotating.open()?;
        }
        Ok(rotating)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self) -> io::Result<&SizeRollingAppender> {
        if self.appender.is_none() {
            let pattern = self
                .path
                .to_str()
                .map(|path| format!("{path}.{{}}"))
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "log file path is not UTF-8")
                })?;
            let roller = FixedWindowRoller::builder()
                .base(1)
                .build(&pattern, self.backup_count)
                .map_err(rotation_error)?;
            let policy = CompoundPolicy::new(
                Box::new(SizeTrigger::new(self.max_bytes)),
                Box::new(roller),
            );
            let appender = SizeRollingAppender::builder()
                .append(true)
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .build(&self.path, Box::new(policy))?;
            self.appender = Some(appender);
        }
        // Set right above when missing.
        self.appender
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file is not open"))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let appender = self.open()?;
        appender
            .append(&log::Record::builder().args(format_args!("{line}")).build())
            .map_err(rotation_error)
    }
}

fn rotation_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}
