use crate::config::level::LogLevel;

/// Namespace under which project loggers live.
pub const PROJECT_NAMESPACE: &str = "conv_lstm";

/// Logging configuration file looked up when the caller does not provide one.
pub const DEFAULT_LOG_CONFIG: &str = "logging.yml";

/// Logger used to report problems found while setting up logging itself.
pub const SETUP_LOGGER: &str = "setup";

pub const LOG_LEVEL: LogLevel = LogLevel::INFO;

pub const LOG_FORMAT: &str =
    "%(asctime)s %(name)s[%(process)d] %(levelname)-8s[%(module)s:%(lineno)d] %(message)s";

/// Format installed on the root logger by `basic_config`.
pub const BASIC_FORMAT: &str = "%(levelname)s:%(name)s:%(message)s";

/// Format used when a formatter does not define one.
pub const MESSAGE_FORMAT: &str = "%(message)s";

/// Timestamp layout used for `asctime` when no `datefmt` is configured. Milliseconds are appended.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Level of the root logger before anything configures it.
pub const ROOT_DEFAULT_LEVEL: LogLevel = LogLevel::WARNING;

pub const ROOT_LOGGER_NAME: &str = "root";

pub const DEFAULT_LEVEL_STYLES: &str =
    "trace=green,faint;debug=green;info=;warning=yellow;error=red;critical=red,bold";

pub const DEFAULT_FIELD_STYLES: &str =
    "asctime=green;hostname=magenta;levelname=black,bold;name=blue;programname=cyan";
