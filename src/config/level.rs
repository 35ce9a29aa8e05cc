use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

#[derive(Error, Debug, PartialEq)]
#[error("unknown level: `{0}`")]
pub struct UnknownLevel(pub String);

/// Numeric severity of a record, a logger or a handler.
///
/// Higher values are more severe. `NOTSET` on a logger means "inherit from the parent"
/// and on a handler means "accept everything".
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct LogLevel(u32);

impl LogLevel {
    pub const NOTSET: LogLevel = LogLevel(0);
    pub const TRACE: LogLevel = LogLevel(5);
    pub const DEBUG: LogLevel = LogLevel(10);
    pub const INFO: LogLevel = LogLevel(20);
    pub const WARNING: LogLevel = LogLevel(30);
    pub const ERROR: LogLevel = LogLevel(40);
    pub const CRITICAL: LogLevel = LogLevel(50);

    pub const fn from_number(value: u32) -> Self {
        Self(value)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn is_notset(&self) -> bool {
        self.0 == 0
    }

    /// Name printed for `levelname`. Unnamed numeric levels render as `Level N`.
    pub fn name(&self) -> String {
        match *self {
            Self::NOTSET => "NOTSET".to_string(),
            Self::TRACE => "TRACE".to_string(),
            Self::DEBUG => "DEBUG".to_string(),
            Self::INFO => "INFO".to_string(),
            Self::WARNING => "WARNING".to_string(),
            Self::ERROR => "ERROR".to_string(),
            Self::CRITICAL => "CRITICAL".to_string(),
            Self(n) => format!("Level {n}"),
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => Self::TRACE,
            Level::DEBUG => Self::DEBUG,
            Level::INFO => Self::INFO,
            Level::WARN => Self::WARNING,
            Level::ERROR => Self::ERROR,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Ok(Self(number));
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(Self::NOTSET),
            "TRACE" => Ok(Self::TRACE),
            "DEBUG" => Ok(Self::DEBUG),
            "INFO" => Ok(Self::INFO),
            "WARNING" | "WARN" => Ok(Self::WARNING),
            "ERROR" => Ok(Self::ERROR),
            "CRITICAL" | "FATAL" => Ok(Self::CRITICAL),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LogLevelVisitor;

        impl<'de> Visitor<'de> for LogLevelVisitor {
            type Value = LogLevel;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a level name or a non negative level number")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                u32::try_from(value)
                    .map(LogLevel)
                    .map_err(|_| E::custom(format!("level out of range: {value}")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u32::try_from(value)
                    .map(LogLevel)
                    .map_err(|_| E::custom(format!("level out of range: {value}")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                LogLevel::from_str(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(LogLevelVisitor)
    }
}
