use crate::logging::format::FormatError;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a logging configuration is rejected.
#[derive(Error, Debug)]
pub enum LoggingConfigError {
    #[error("invalid logging configuration: `{0}`")]
    Invalid(#[from] serde_yaml::Error),

    #[error("logging configuration must be a mapping")]
    NotAMapping,

    #[error("unsupported version: `{0}`")]
    UnsupportedVersion(u32),

    #[error("`filename` of handler `{0}` must be a string")]
    InvalidFilename(String),

    #[error("unable to configure formatter `{formatter}`: {source}")]
    Formatter {
        formatter: String,
        source: FormatError,
    },

    #[error("unable to configure handler `{handler}`: formatter `{formatter}` is not defined")]
    UnknownFormatter { handler: String, formatter: String },

    #[error("unable to configure `{owner}`: filter `{filter}` is not defined")]
    UnknownFilter { owner: String, filter: String },

    #[error("unable to configure logger `{logger}`: handler `{handler}` is not defined")]
    UnknownHandler { logger: String, handler: String },

    #[error("unable to configure handler `{handler}`: unsupported rotation `{when}` every {interval}")]
    UnsupportedRotation {
        handler: String,
        when: String,
        interval: u32,
    },

    #[error("unable to configure handler `{handler}`: invalid file path `{}`", path.display())]
    InvalidFilePath { handler: String, path: PathBuf },

    #[error("unable to configure handler `{handler}`: `{source}`")]
    Handler {
        handler: String,
        source: std::io::Error,
    },
}
