//! Resolution of the directory a run writes its logs to.
//!
//! The mapping from a run configuration to its output directory belongs to the training
//! harness. This crate only needs the resulting directory, so it depends on the
//! [LogPathResolver] trait and lets callers plug in their own logic.
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait LogPathResolver {
    /// Directory where the logs of the run described by `run_config` are written.
    fn log_path(&self, run_config: &Path) -> PathBuf;
}

impl<F> LogPathResolver for F
where
    F: Fn(&Path) -> PathBuf,
{
    fn log_path(&self, run_config: &Path) -> PathBuf {
        self(run_config)
    }
}

/// Resolves every run configuration to the same directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLogPath(PathBuf);

impl FixedLogPath {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }
}

impl LogPathResolver for FixedLogPath {
    fn log_path(&self, _run_config: &Path) -> PathBuf {
        self.0.clone()
    }
}
