//! Logger hierarchy, handlers and formatters, fed by `tracing` events.
pub mod console;
pub mod format;
pub mod handler;
pub mod layer;
pub mod logger;
pub mod options;
pub mod record;
pub mod registry;
mod sink;
pub mod style;
pub mod tracer;

pub use logger::Logger;
pub use options::LoggerOptions;
pub use registry::{LoggingRegistry, LoggingRegistryBuilder};
pub use tracer::{global_registry, TracerError};
