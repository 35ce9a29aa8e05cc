use super::error::LoggingConfigError;
use super::logging_config::LoggingConfig;
use super::rewrite::rewrite_handler_filenames;
use crate::file_reader::{FileReader, FileReaderError, LocalFile};
use crate::run_path::LogPathResolver;
use serde_yaml::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadConfigError {
    #[error("error reading logging configuration: `{0}`")]
    Read(FileReaderError),

    #[error("malformed logging configuration: `{0}`")]
    Parse(serde_yaml::Error),

    #[error("{0}")]
    Schema(#[from] LoggingConfigError),
}

/// Result of looking up a logging configuration file.
#[derive(Debug, PartialEq)]
pub enum ConfigLoad {
    /// There is no file at the given path.
    Missing,
    Loaded(LoggingConfig),
}

/// Reads `logging.yml`-like files and anchors their handler files under a run directory.
pub struct LoggingConfigLoader<F = LocalFile>
where
    F: FileReader,
{
    file_reader: F,
}

impl Default for LoggingConfigLoader<LocalFile> {
    fn default() -> Self {
        Self::new(LocalFile)
    }
}

impl<F> LoggingConfigLoader<F>
where
    F: FileReader,
{
    pub fn new(file_reader: F) -> Self {
        Self { file_reader }
    }

    /// Loads the configuration at `log_config`.
    ///
    /// `log_path` is asked for the run directory only when the file exists.
    pub fn load<R>(
        &self,
        log_config: &Path,
        run_config: &Path,
        log_path: &R,
    ) -> Result<ConfigLoad, LoadConfigError>
    where
        R: LogPathResolver + ?Sized,
    {
        let content = match self.file_reader.read(log_config) {
            Ok(content) => content,
            Err(FileReaderError::FileNotFound(_)) => return Ok(ConfigLoad::Missing),
            Err(err) => return Err(LoadConfigError::Read(err)),
        };

        let document: Value = serde_yaml::from_str(&content).map_err(LoadConfigError::Parse)?;
        let Value::Mapping(mut mapping) = document else {
            return Err(LoggingConfigError::NotAMapping.into());
        };

        let run_dir = log_path.log_path(run_config);
        rewrite_handler_filenames(&mut mapping, &run_dir)?;

        let config: LoggingConfig = serde_yaml::from_value(Value::Mapping(mapping))
            .map_err(LoggingConfigError::Invalid)?;
        Ok(ConfigLoad::Loaded(config))
    }
}
