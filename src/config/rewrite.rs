use super::error::LoggingConfigError;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

const HANDLERS_KEY: &str = "handlers";
const FILENAME_KEY: &str = "filename";

/// Anchors every handler `filename` under `run_dir`.
///
/// Only `handlers.<name>.filename` values are touched. A document without `handlers`
/// is left as is. Absolute filenames stay absolute.
pub fn rewrite_handler_filenames(
    config: &mut Mapping,
    run_dir: &Path,
) -> Result<(), LoggingConfigError> {
    let Some(Value::Mapping(handlers)) = config.get_mut(HANDLERS_KEY) else {
        return Ok(());
    };

    for (name, handler) in handlers.iter_mut() {
        let Value::Mapping(handler) = handler else {
            continue;
        };
        let Some(filename) = handler.get_mut(FILENAME_KEY) else {
            continue;
        };
        let Value::String(relative) = filename else {
            return Err(LoggingConfigError::InvalidFilename(handler_name(name)));
        };
        *relative = run_dir
            .join(relative.as_str())
            .into_os_string()
            .into_string()
            .map_err(|path| LoggingConfigError::InvalidFilePath {
                handler: handler_name(name),
                path: PathBuf::from(path),
            })?;
    }

    Ok(())
}

fn handler_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
