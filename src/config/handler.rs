use super::level::LogLevel;
use serde::Deserialize;
use std::path::PathBuf;

/// Console stream a stream handler writes to.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub enum ConsoleStream {
    #[serde(rename = "ext://sys.stdout", alias = "stdout")]
    Stdout,
    #[default]
    #[serde(rename = "ext://sys.stderr", alias = "stderr")]
    Stderr,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum FileMode {
    #[default]
    #[serde(rename = "a")]
    Append,
    #[serde(rename = "w")]
    Truncate,
}

/// Destination of a handler, selected by its `class`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(tag = "class")]
pub enum HandlerKind {
    #[serde(rename = "logging.StreamHandler")]
    Stream {
        #[serde(default)]
        stream: ConsoleStream,
    },
    #[serde(rename = "coloredlogs.StandardErrorHandler")]
    StandardError,
    #[serde(rename = "logging.FileHandler")]
    File {
        filename: PathBuf,
        #[serde(default)]
        mode: FileMode,
        #[serde(default)]
        delay: bool,
    },
    #[serde(rename = "logging.handlers.RotatingFileHandler")]
    RotatingFile {
        filename: PathBuf,
        #[serde(default)]
        mode: FileMode,
        #[serde(default, rename = "maxBytes")]
        max_bytes: u64,
        #[serde(default, rename = "backupCount")]
        backup_count: u32,
        #[serde(default)]
        delay: bool,
    },
    #[serde(rename = "logging.handlers.TimedRotatingFileHandler")]
    TimedRotatingFile {
        filename: PathBuf,
        #[serde(default = "when_default")]
        when: String,
        #[serde(default = "interval_default")]
        interval: u32,
        #[serde(default, rename = "backupCount")]
        backup_count: usize,
    },
    #[serde(rename = "logging.NullHandler")]
    Null,
}

fn when_default() -> String {
    "H".to_string()
}

fn interval_default() -> u32 {
    1
}

/// A `handlers` entry.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct HandlerConfig {
    #[serde(flatten)]
    pub kind: HandlerKind,
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub formatter: Option<String>,
    #[serde(default)]
    pub filters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn stream_handler_defaults_to_stderr() {
        let handler: HandlerConfig =
            serde_yaml::from_str("class: logging.StreamHandler\nlevel: DEBUG").unwrap();
        assert_eq!(
            HandlerKind::Stream {
                stream: ConsoleStream::Stderr
            },
            handler.kind
        );
        assert_eq!(Some(LogLevel::DEBUG), handler.level);
    }

    #[test]
    fn rotating_file_handler_settings() {
        let handler: HandlerConfig = serde_yaml::from_str(
            r#"
class: logging.handlers.RotatingFileHandler
level: INFO
formatter: simple
filename: info.log
maxBytes: 10485760
backupCount: 20
encoding: utf8
"#,
        )
        .unwrap();
        assert_eq!(
            HandlerKind::RotatingFile {
                filename: PathBuf::from("info.log"),
                mode: FileMode::Append,
                max_bytes: 10485760,
                backup_count: 20,
                delay: false,
            },
            handler.kind
        );
        assert_eq!(Some("simple".to_string()), handler.formatter);
    }

    #[test]
    fn unknown_handler_class_is_rejected() {
        let result = serde_yaml::from_str::<HandlerConfig>("class: logging.SocketHandler");
        assert_matches!(result, Err(_));
    }

    #[test]
    fn file_handler_requires_a_filename() {
        let result = serde_yaml::from_str::<HandlerConfig>("class: logging.FileHandler");
        assert_matches!(result, Err(_));
    }
}
