use crate::config::error::LoggingConfigError;
use crate::config::loader::LoadConfigError;
use crate::file_reader::FileReaderError;
use crate::logging::tracer::TracerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("could not parse logging configuration: `{0}`")]
    Parse(serde_yaml::Error),

    #[error("invalid logging configuration: {0}")]
    Schema(#[from] LoggingConfigError),

    #[error("could not read logging configuration: `{0}`")]
    Read(#[from] FileReaderError),

    #[error("{0}")]
    Tracer(#[from] TracerError),
}

impl From<LoadConfigError> for SetupError {
    fn from(err: LoadConfigError) -> Self {
        match err {
            LoadConfigError::Read(err) => Self::Read(err),
            LoadConfigError::Parse(err) => Self::Parse(err),
            LoadConfigError::Schema(err) => Self::Schema(err),
        }
    }
}
