use super::level::LogLevel;
use serde::Deserialize;

/// A `loggers` entry, also used for `root`.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LoggerConfig {
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    /// Ignored for `root`.
    #[serde(default)]
    pub propagate: Option<bool>,
}

/// A `filters` entry. Lets through records of the named logger and its descendants.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct FilterConfig {
    #[serde(default)]
    pub name: String,
}
