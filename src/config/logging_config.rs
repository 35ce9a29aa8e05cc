use super::formatter::FormatterConfig;
use super::handler::HandlerConfig;
use super::logger::{FilterConfig, LoggerConfig};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Declarative logging configuration as read from `logging.yml`.
///
/// Handlers are kept ordered by name so they are built in a stable order.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LoggingConfig {
    pub version: u32,
    #[serde(default)]
    pub incremental: bool,
    #[serde(default = "disable_existing_loggers_default")]
    pub disable_existing_loggers: bool,
    #[serde(default)]
    pub formatters: HashMap<String, FormatterConfig>,
    #[serde(default)]
    pub filters: HashMap<String, FilterConfig>,
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,
    #[serde(default)]
    pub loggers: HashMap<String, LoggerConfig>,
    #[serde(default)]
    pub root: Option<LoggerConfig>,
}

fn disable_existing_loggers_default() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            version: 1,
            incremental: false,
            disable_existing_loggers: disable_existing_loggers_default(),
            formatters: HashMap::default(),
            filters: HashMap::default(),
            handlers: BTreeMap::default(),
            loggers: HashMap::default(),
            root: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::handler::{ConsoleStream, HandlerKind};
    use crate::config::level::LogLevel;
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    const TEMPLATE_CONFIG: &str = r#"
version: 1
disable_existing_loggers: False
formatters:
  simple:
    format: "%(asctime)s - %(name)s - %(levelname)s - %(message)s"
handlers:
  console:
    class: logging.StreamHandler
    level: DEBUG
    formatter: simple
    stream: ext://sys.stdout
  info_file_handler:
    class: logging.handlers.RotatingFileHandler
    level: INFO
    formatter: simple
    filename: info.log
    maxBytes: 10485760
    backupCount: 20
    encoding: utf8
root:
  level: INFO
  handlers: [console, info_file_handler]
"#;

    #[test]
    fn parse_template_config() {
        let config: LoggingConfig = serde_yaml::from_str(TEMPLATE_CONFIG).unwrap();

        assert_eq!(1, config.version);
        assert!(!config.disable_existing_loggers);
        assert!(!config.incremental);
        assert_eq!(
            HandlerKind::Stream {
                stream: ConsoleStream::Stdout
            },
            config.handlers["console"].kind
        );
        assert_matches!(
            &config.handlers["info_file_handler"].kind,
            HandlerKind::RotatingFile { filename, .. } => {
                assert_eq!(&PathBuf::from("info.log"), filename);
            }
        );
        let root = config.root.unwrap();
        assert_eq!(Some(LogLevel::INFO), root.level);
        assert_eq!(vec!["console", "info_file_handler"], root.handlers);
    }

    #[test]
    fn version_is_required() {
        let result = serde_yaml::from_str::<LoggingConfig>("handlers: {}");
        assert_matches!(result, Err(_));
    }

    #[test]
    fn everything_but_version_is_optional() {
        let config: LoggingConfig = serde_yaml::from_str("version: 1").unwrap();
        assert_eq!(LoggingConfig::default(), config);
    }
}
