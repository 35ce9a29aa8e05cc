//! Logging setup for a training run: a declarative configuration whose log files land in
//! the run directory, plus a (colored) console handler.
use crate::config::formatter::FormatStyle;
use crate::config::level::LogLevel;
use crate::config::loader::{ConfigLoad, LoggingConfigLoader};
use crate::defaults::{DEFAULT_DATE_FORMAT, LOG_FORMAT, LOG_LEVEL, PROJECT_NAMESPACE, SETUP_LOGGER};
use crate::error::SetupError;
use crate::file_reader::FileReader;
use crate::logging::format::{FormatError, RecordFormat};
use crate::logging::handler::Handler;
use crate::logging::style::{colored_or_plain, PlainStyle, RecordStyle};
use crate::logging::{global_registry, Logger, LoggerOptions, LoggingRegistry};
use crate::run_path::LogPathResolver;
use std::path::Path;
use std::sync::Arc;

const COLORS_UNAVAILABLE: &str =
    "color support not available -- falling back to standard logging.";

impl LoggingRegistry {
    /// Configures logging from the YAML file at `log_config`, with the `filename` of every
    /// handler anchored under the run directory `log_path` resolves for `run_config`.
    ///
    /// A missing file is not an error: a basic stderr configuration is installed instead and
    /// a warning is logged.
    pub fn setup_logging<R>(
        &self,
        run_config: &Path,
        log_config: &Path,
        log_path: &R,
    ) -> Result<(), SetupError>
    where
        R: LogPathResolver + ?Sized,
    {
        self.setup_logging_with_loader(
            &LoggingConfigLoader::default(),
            run_config,
            log_config,
            log_path,
        )
    }

    pub fn setup_logging_with_loader<F, R>(
        &self,
        loader: &LoggingConfigLoader<F>,
        run_config: &Path,
        log_config: &Path,
        log_path: &R,
    ) -> Result<(), SetupError>
    where
        F: FileReader,
        R: LogPathResolver + ?Sized,
    {
        match loader.load(log_config, run_config, log_path)? {
            ConfigLoad::Missing => {
                self.basic_config(LOG_LEVEL);
                self.logger(SETUP_LOGGER).warning(format!(
                    "\"{}\" not found. Using basicConfig.",
                    log_config.display()
                ));
            }
            ConfigLoad::Loaded(config) => {
                self.configure(config)?;
                self.setup_logger(
                    None,
                    LOG_LEVEL,
                    LoggerOptions {
                        reconfigure: true,
                        ..Default::default()
                    },
                );
            }
        }
        Ok(())
    }

    /// Sets the level of the selected logger and installs a console handler for it.
    ///
    /// Any name selects the root logger, no name selects `conv_lstm.None`.
    pub fn setup_logger(
        &self,
        name: Option<&str>,
        log_level: LogLevel,
        options: LoggerOptions,
    ) -> Logger {
        let logger = match name {
            Some(_) => self.root(),
            None => self.logger(&format!("{PROJECT_NAMESPACE}.None")),
        };
        logger.set_level(log_level);

        if !self.color_support() {
            logger.debug(COLORS_UNAVAILABLE);
            return logger;
        }

        let (format, invalid) = console_format(&options);
        let style: Arc<dyn RecordStyle> = if options.use_colors(self.console().as_ref()) {
            colored_or_plain(
                options.level_styles.as_deref(),
                options.field_styles.as_deref(),
            )
        } else {
            Arc::new(PlainStyle)
        };
        let handler = Handler::console(
            options.stream,
            self.console().clone(),
            log_level,
            format,
            style,
        );
        self.install_console_handler(logger.name(), log_level, handler, options.reconfigure);

        if let Some(err) = invalid {
            logger.warning(format!("{err}, using the default log format"));
        }
        logger
    }
}

/// Console handler format, the default one when the requested one is invalid.
fn console_format(options: &LoggerOptions) -> (RecordFormat, Option<FormatError>) {
    let datefmt = options
        .datefmt
        .as_deref()
        .or((!options.milliseconds).then_some(DEFAULT_DATE_FORMAT));
    let fmt = options.fmt.as_deref().unwrap_or(LOG_FORMAT);
    match RecordFormat::parse(Some(fmt), datefmt, options.style, true) {
        Ok(format) => (format, None),
        Err(err) => {
            let format = RecordFormat::parse(Some(LOG_FORMAT), None, FormatStyle::Percent, true)
                .unwrap_or_default();
            (format, Some(err))
        }
    }
}

/// [LoggingRegistry::setup_logging] on the global registry.
pub fn setup_logging<R>(run_config: &Path, log_config: &Path, log_path: &R) -> Result<(), SetupError>
where
    R: LogPathResolver + ?Sized,
{
    global_registry()?.setup_logging(run_config, log_config, log_path)
}

/// [LoggingRegistry::setup_logger] on the global registry.
pub fn setup_logger(
    name: Option<&str>,
    log_level: LogLevel,
    options: LoggerOptions,
) -> Result<Logger, SetupError> {
    Ok(global_registry()?.setup_logger(name, log_level, options))
}
