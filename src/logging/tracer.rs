use super::registry::LoggingRegistry;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TracerError {
    #[error("init logging error: `{0}`")]
    TryInitError(String),
}

static GLOBAL_REGISTRY: OnceLock<Result<LoggingRegistry, TracerError>> = OnceLock::new();

impl LoggingRegistry {
    /// Installs the registry as the global `tracing` subscriber. Records of the `log` crate
    /// are bridged too.
    pub fn try_init(&self) -> Result<(), TracerError> {
        tracing_subscriber::registry()
            .with(self.layer())
            .try_init()
            .map_err(|_| {
                TracerError::TryInitError("unable to set global logging subscriber".to_string())
            })
    }
}

/// The process wide registry, created and installed as the global subscriber on first use.
pub fn global_registry() -> Result<&'static LoggingRegistry, TracerError> {
    GLOBAL_REGISTRY
        .get_or_init(|| {
            let registry = LoggingRegistry::new();
            registry.try_init().map(|()| registry)
        })
        .as_ref()
        .map_err(Clone::clone)
}
