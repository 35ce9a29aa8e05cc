//! Logging setup for conv_lstm training runs.
//!
//! A YAML logging configuration (`logging.yml`) is loaded, the files of its handlers are
//! anchored under the directory of the current run and the result is applied to a
//! [LoggingRegistry]: a logger hierarchy fed by `tracing` events. A console handler, colored
//! when the `color` feature is enabled, is installed on top.
//!
//! ```no_run
//! use conv_lstm_logging::{setup_logging, FixedLogPath, DEFAULT_LOG_CONFIG};
//! use std::path::Path;
//!
//! setup_logging(
//!     Path::new("runs/42/config.json"),
//!     Path::new(DEFAULT_LOG_CONFIG),
//!     &FixedLogPath::new("runs/42"),
//! )?;
//! tracing::info!(target: "conv_lstm::train", "starting");
//! # Ok::<(), conv_lstm_logging::SetupError>(())
//! ```
pub mod config;
pub mod defaults;
pub mod error;
pub mod file_reader;
pub mod logging;
pub mod run_path;
pub mod setup;

pub use config::level::LogLevel;
pub use defaults::{DEFAULT_LOG_CONFIG, LOG_FORMAT, LOG_LEVEL};
pub use error::SetupError;
pub use logging::{Logger, LoggerOptions, LoggingRegistry};
pub use run_path::{FixedLogPath, LogPathResolver};
pub use setup::{setup_logger, setup_logging};
