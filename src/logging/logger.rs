use super::handler::HandlerInfo;
use super::record::Record;
use super::registry::{is_root, LoggingRegistry};
use crate::config::level::LogLevel;
use crate::defaults::ROOT_LOGGER_NAME;
use std::panic::Location;

/// Handle to a named logger of a [LoggingRegistry].
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    registry: LoggingRegistry,
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Logger {
    pub(crate) fn new(name: &str, registry: LoggingRegistry) -> Self {
        let name = if is_root(name) { ROOT_LOGGER_NAME } else { name };
        Self {
            name: name.to_string(),
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        is_root(&self.name)
    }

    /// Level set on this logger, [LogLevel::NOTSET] when it inherits it.
    pub fn level(&self) -> LogLevel {
        self.registry
            .read()
            .node(&self.name)
            .map(|node| node.level)
            .unwrap_or(LogLevel::NOTSET)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.registry.write().node_mut(&self.name).level = level;
    }

    pub fn effective_level(&self) -> LogLevel {
        self.registry.read().effective_level(&self.name)
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        self.registry.read().is_enabled_for(&self.name, level)
    }

    pub fn propagate(&self) -> bool {
        self.registry
            .read()
            .node(&self.name)
            .map_or(true, |node| node.propagate)
    }

    pub fn set_propagate(&self, propagate: bool) {
        self.registry.write().node_mut(&self.name).propagate = propagate;
    }

    pub fn disabled(&self) -> bool {
        self.registry
            .read()
            .node(&self.name)
            .is_some_and(|node| node.disabled)
    }

    /// Handlers attached to this logger, not including the ones of its ancestors.
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.registry.handler_infos(&self.name)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.is_enabled_for(level) {
            return;
        }
        let record =
            Record::new(&self.name, level, message.into()).with_location(Location::caller());
        self.registry.dispatch(record);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::DEBUG, message)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::INFO, message)
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::WARNING, message)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::ERROR, message)
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::CRITICAL, message)
    }
}
