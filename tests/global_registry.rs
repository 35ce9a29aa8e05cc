use conv_lstm_logging::config::level::LogLevel;
use conv_lstm_logging::logging::global_registry;
use conv_lstm_logging::{setup_logger, setup_logging, FixedLogPath, LoggerOptions};
use std::fs;
use std::path::Path;

#[test]
fn free_functions_configure_the_global_registry() {
    let dir = tempfile::tempdir().unwrap();
    let log_config = dir.path().join("logging.yml");
    fs::write(
        &log_config,
        r#"
version: 1
formatters:
  simple:
    format: "%(levelname)s %(name)s %(message)s"
handlers:
  file:
    class: logging.FileHandler
    formatter: simple
    filename: run.log
loggers:
  conv_lstm:
    level: DEBUG
root:
  level: WARNING
  handlers: [file]
"#,
    )
    .unwrap();

    setup_logging(
        Path::new("run.json"),
        &log_config,
        &FixedLogPath::new(dir.path()),
    )
    .unwrap();
    tracing::debug!(target: "conv_lstm::model", "layers built");
    tracing::info!(target: "torch", "ignored");
    log::warn!(target: "conv_lstm::legacy", "from the log crate");
    assert!(tracing::dispatcher::has_been_set());

    let logger = setup_logger(Some("any"), LogLevel::ERROR, LoggerOptions::default()).unwrap();
    assert!(logger.is_root());
    assert_eq!(LogLevel::ERROR, global_registry().unwrap().root().level());

    let written = fs::read_to_string(dir.path().join("run.log")).unwrap();
    assert!(written.starts_with("DEBUG conv_lstm.model layers built\n"));
    assert!(written.contains("\nWARNING conv_lstm.legacy from the log crate\n"));
    assert!(!written.contains("ignored"));
    // A second global subscriber cannot be installed.
    assert!(global_registry().unwrap().try_init().is_err());
}

