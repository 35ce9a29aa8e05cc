use super::console::{ConsoleProvider, StdConsole};
use super::format::RecordFormat;
use super::handler::{Handler, HandlerInfo, NameFilter};
use super::layer::RegistryLayer;
use super::logger::Logger;
use super::record::Record;
use super::style::{PlainStyle, RecordStyle};
use crate::config::error::LoggingConfigError;
use crate::config::formatter::{FormatStyle, FormatterClass};
use crate::config::handler::ConsoleStream;
use crate::config::level::LogLevel;
use crate::config::logger::LoggerConfig;
use crate::config::logging_config::LoggingConfig;
use crate::defaults::{BASIC_FORMAT, ROOT_DEFAULT_LEVEL, ROOT_LOGGER_NAME};
use chrono::{DateTime, Local};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::iter;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

const SUPPORTED_VERSION: u32 = 1;

/// Process-scoped logging state: the logger hierarchy and the handlers attached to it.
///
/// Cloning is cheap and clones share the same state. Records reach it either through
/// [Logger] handles or, once installed as a `tracing` subscriber (see
/// [LoggingRegistry::try_init]), from `tracing` events.
///
/// Reconfiguring while other threads log is safe but not coordinated: concurrent
/// `configure` calls are applied one after the other in no particular order.
#[derive(Debug, Clone)]
pub struct LoggingRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    state: RwLock<RegistryState>,
    console: Arc<dyn ConsoleProvider>,
    colors: bool,
    started: DateTime<Local>,
}

#[derive(Debug)]
pub(crate) struct LoggerNode {
    pub(crate) level: LogLevel,
    pub(crate) handlers: Vec<Arc<Handler>>,
    pub(crate) filters: Vec<NameFilter>,
    pub(crate) propagate: bool,
    pub(crate) disabled: bool,
}

impl LoggerNode {
    fn new(level: LogLevel) -> Self {
        Self {
            level,
            handlers: Vec::new(),
            filters: Vec::new(),
            propagate: true,
            disabled: false,
        }
    }
}

impl Default for LoggerNode {
    fn default() -> Self {
        Self::new(LogLevel::NOTSET)
    }
}

#[derive(Debug)]
pub(crate) struct RegistryState {
    root: LoggerNode,
    loggers: BTreeMap<String, LoggerNode>,
    handlers: BTreeMap<String, Arc<Handler>>,
}

pub(crate) fn is_root(name: &str) -> bool {
    name.is_empty() || name == ROOT_LOGGER_NAME
}

/// `a.b.c`, `a.b`, `a`
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    iter::successors(Some(name), |current| {
        current.rsplit_once('.').map(|(parent, _)| parent)
    })
}

impl RegistryState {
    fn new() -> Self {
        Self {
            root: LoggerNode::new(ROOT_DEFAULT_LEVEL),
            loggers: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }

    pub(crate) fn node(&self, name: &str) -> Option<&LoggerNode> {
        if is_root(name) {
            Some(&self.root)
        } else {
            self.loggers.get(name)
        }
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> &mut LoggerNode {
        if is_root(name) {
            &mut self.root
        } else {
            self.loggers.entry(name.to_string()).or_default()
        }
    }

    /// The logger (if it exists) and its existing ancestors, ending with the root.
    fn chain<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (&'a str, &'a LoggerNode)> {
        let named = (!is_root(name))
            .then(|| {
                ancestors(name).filter_map(|ancestor| {
                    self.loggers
                        .get(ancestor)
                        .map(|node| (ancestor, node))
                })
            })
            .into_iter()
            .flatten();
        named.chain(iter::once((ROOT_LOGGER_NAME, &self.root)))
    }

    /// Level of the nearest logger, walking up the hierarchy, that has one set.
    pub(crate) fn effective_level(&self, name: &str) -> LogLevel {
        self.chain(name)
            .map(|(_, node)| node.level)
            .find(|level| !level.is_notset())
            .unwrap_or(LogLevel::NOTSET)
    }

    pub(crate) fn is_enabled_for(&self, name: &str, level: LogLevel) -> bool {
        if self.node(name).is_some_and(|node| node.disabled) {
            return false;
        }
        level >= self.effective_level(name)
    }

    /// Handlers a record of `name` would visit, honoring `propagate`.
    fn reachable_handlers(&self, name: &str) -> Vec<Arc<Handler>> {
        let mut handlers = Vec::new();
        for (_, node) in self.chain(name) {
            handlers.extend(node.handlers.iter().cloned());
            if !node.propagate {
                break;
            }
        }
        handlers
    }

    fn clear_handlers(&mut self) {
        self.root.handlers.clear();
        for node in self.loggers.values_mut() {
            node.handlers.clear();
        }
        self.handlers.clear();
    }
}

/// Everything a non incremental configuration builds before touching the registry.
struct BuiltConfig {
    handlers: BTreeMap<String, Arc<Handler>>,
    loggers: Vec<(String, BuiltLogger)>,
    root: Option<BuiltLogger>,
}

struct BuiltLogger {
    level: Option<LogLevel>,
    handlers: Vec<Arc<Handler>>,
    filters: Vec<NameFilter>,
    propagate: bool,
}

/// Builds a [LoggingRegistry].
#[derive(Debug)]
pub struct LoggingRegistryBuilder {
    console: Arc<dyn ConsoleProvider>,
    colors: bool,
}

impl Default for LoggingRegistryBuilder {
    fn default() -> Self {
        Self {
            console: Arc::new(StdConsole),
            colors: cfg!(feature = "color"),
        }
    }
}

impl LoggingRegistryBuilder {
    pub fn console(mut self, console: impl ConsoleProvider + 'static) -> Self {
        self.console = Arc::new(console);
        self
    }

    /// Behave as if color support was not available.
    pub fn without_colors(mut self) -> Self {
        self.colors = false;
        self
    }

    pub fn build(self) -> LoggingRegistry {
        LoggingRegistry {
            inner: Arc::new(RegistryInner {
                state: RwLock::new(RegistryState::new()),
                console: self.console,
                colors: self.colors,
                started: Local::now(),
            }),
        }
    }
}

impl Default for LoggingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingRegistry {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LoggingRegistryBuilder {
        LoggingRegistryBuilder::default()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn console(&self) -> &Arc<dyn ConsoleProvider> {
        &self.inner.console
    }

    /// Whether colored console output can be installed.
    pub fn color_support(&self) -> bool {
        cfg!(feature = "color") && self.inner.colors
    }

    /// Handle to the logger called `name`, creating it when missing. `""` and `"root"`
    /// name the root logger.
    pub fn logger(&self, name: &str) -> Logger {
        if !is_root(name) {
            self.write().node_mut(name);
        }
        Logger::new(name, self.clone())
    }

    pub fn root(&self) -> Logger {
        Logger::new(ROOT_LOGGER_NAME, self.clone())
    }

    /// `tracing` layer feeding events into this registry.
    pub fn layer(&self) -> RegistryLayer {
        RegistryLayer::new(self.clone())
    }

    /// Sends `record` through the logger hierarchy.
    pub fn dispatch(&self, mut record: Record) {
        record.relative_created_ms = (record.created - self.inner.started).num_milliseconds();

        let handlers = {
            let state = self.read();
            if !state.is_enabled_for(&record.name, record.level) {
                return;
            }
            let filtered_out = state
                .node(&record.name)
                .is_some_and(|node| !node.filters.iter().all(|f| f.accepts(&record.name)));
            if filtered_out {
                return;
            }
            state.reachable_handlers(&record.name)
        };

        if handlers.is_empty() {
            self.last_resort(&record);
            return;
        }
        for handler in handlers {
            handler.handle(&record);
        }
    }

    /// Used when no handler is reachable at all: warnings and above go to stderr.
    fn last_resort(&self, record: &Record) {
        if record.level < LogLevel::WARNING {
            return;
        }
        let mut writer = self.inner.console.writer(ConsoleStream::Stderr);
        let _ = writeln!(writer, "{}", record.message);
    }

    /// Installs a stderr handler on the root logger using `%(levelname)s:%(name)s:%(message)s`.
    /// Does nothing when the root logger already has handlers.
    pub fn basic_config(&self, level: LogLevel) {
        let mut state = self.write();
        if !state.root.handlers.is_empty() {
            return;
        }
        let format = RecordFormat::parse(Some(BASIC_FORMAT), None, FormatStyle::Percent, true)
            .unwrap_or_default();
        state.root.handlers.push(Arc::new(Handler::console(
            ConsoleStream::Stderr,
            self.inner.console.clone(),
            LogLevel::NOTSET,
            format,
            Arc::new(PlainStyle),
        )));
        state.root.level = level;
    }

    /// Applies a declarative configuration.
    ///
    /// Nothing changes when the configuration is rejected.
    pub fn configure(&self, config: LoggingConfig) -> Result<(), LoggingConfigError> {
        if config.version != SUPPORTED_VERSION {
            return Err(LoggingConfigError::UnsupportedVersion(config.version));
        }
        if config.incremental {
            self.configure_incremental(&config)?;
        } else {
            let disable_existing = config.disable_existing_loggers;
            let built = self.build(config)?;
            self.apply(built, disable_existing);
        }
        debug!("Logging configuration applied");
        Ok(())
    }

    fn configure_incremental(&self, config: &LoggingConfig) -> Result<(), LoggingConfigError> {
        let mut state = self.write();
        for (name, handler_config) in &config.handlers {
            let handler =
                state
                    .handlers
                    .get(name)
                    .ok_or_else(|| LoggingConfigError::UnknownHandler {
                        logger: ROOT_LOGGER_NAME.to_string(),
                        handler: name.clone(),
                    })?;
            if let Some(level) = handler_config.level {
                handler.set_level(level);
            }
        }
        let loggers = config
            .loggers
            .iter()
            .map(|(name, logger)| (name.as_str(), logger))
            .chain(config.root.iter().map(|root| (ROOT_LOGGER_NAME, root)));
        for (name, logger) in loggers {
            if let Some(level) = logger.level {
                state.node_mut(name).level = level;
            }
        }
        Ok(())
    }

    fn build(&self, config: LoggingConfig) -> Result<BuiltConfig, LoggingConfigError> {
        let mut formatters: HashMap<String, (RecordFormat, Arc<dyn RecordStyle>)> =
            HashMap::new();
        for (name, formatter) in &config.formatters {
            let format = RecordFormat::parse(
                formatter.format.as_deref(),
                formatter.datefmt.as_deref(),
                formatter.style,
                formatter.validate,
            )
            .map_err(|source| LoggingConfigError::Formatter {
                formatter: name.clone(),
                source,
            })?;
            let style = match formatter.class {
                FormatterClass::Colored if self.color_support() => {
                    super::style::colored_or_plain(None, None)
                }
                _ => Arc::new(PlainStyle) as Arc<dyn RecordStyle>,
            };
            formatters.insert(name.clone(), (format, style));
        }

        let filters: HashMap<String, NameFilter> = config
            .filters
            .iter()
            .map(|(name, filter)| (name.clone(), NameFilter::new(filter.name.clone())))
            .collect();
        let resolve_filters = |owner: &str, names: &[String]| {
            names
                .iter()
                .map(|name| {
                    filters
                        .get(name)
                        .cloned()
                        .ok_or_else(|| LoggingConfigError::UnknownFilter {
                            owner: owner.to_string(),
                            filter: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let mut handlers = BTreeMap::new();
        for (name, handler_config) in &config.handlers {
            let (format, style) = match &handler_config.formatter {
                Some(formatter) => formatters.get(formatter).cloned().ok_or_else(|| {
                    LoggingConfigError::UnknownFormatter {
                        handler: name.clone(),
                        formatter: formatter.clone(),
                    }
                })?,
                None => (RecordFormat::default(), Arc::new(PlainStyle) as Arc<dyn RecordStyle>),
            };
            let handler_filters = resolve_filters(name, &handler_config.filters)?;
            let (target, sink) = Handler::sink_for(name, &handler_config.kind, self.console())?;
            let handler = Handler::new(
                Some(name.clone()),
                handler_config.level.unwrap_or(LogLevel::NOTSET),
                format,
                style,
                handler_filters,
                target,
                sink,
            );
            handlers.insert(name.clone(), Arc::new(handler));
        }

        let build_logger = |name: &str,
                            logger: &LoggerConfig|
         -> Result<BuiltLogger, LoggingConfigError> {
            let logger_handlers = logger
                .handlers
                .iter()
                .map(|handler| {
                    handlers.get(handler).cloned().ok_or_else(|| {
                        LoggingConfigError::UnknownHandler {
                            logger: name.to_string(),
                            handler: handler.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BuiltLogger {
                level: logger.level,
                handlers: logger_handlers,
                filters: resolve_filters(name, &logger.filters)?,
                propagate: logger.propagate.unwrap_or(true),
            })
        };

        let mut loggers = config
            .loggers
            .iter()
            .map(|(name, logger)| build_logger(name, logger).map(|built| (name.clone(), built)))
            .collect::<Result<Vec<_>, _>>()?;
        loggers.sort_by(|(a, _), (b, _)| a.cmp(b));
        let root = config
            .root
            .as_ref()
            .map(|root| build_logger(ROOT_LOGGER_NAME, root))
            .transpose()?;

        Ok(BuiltConfig {
            handlers,
            loggers,
            root,
        })
    }

    fn apply(&self, built: BuiltConfig, disable_existing: bool) {
        let mut state = self.write();
        state.clear_handlers();
        state.handlers = built.handlers;

        let configured: Vec<&str> = built.loggers.iter().map(|(name, _)| name.as_str()).collect();
        let mut existing: Vec<String> = state
            .loggers
            .keys()
            .filter(|name| !configured.contains(&name.as_str()))
            .cloned()
            .collect();
        // Existing descendants of configured loggers are reset rather than disabled.
        let children: Vec<String> = existing
            .iter()
            .filter(|name| {
                configured
                    .iter()
                    .any(|parent| name.strip_prefix(parent).is_some_and(|r| r.starts_with('.')))
            })
            .cloned()
            .collect();
        existing.retain(|name| !children.contains(name));

        for (name, logger) in built.loggers {
            let node = state.node_mut(&name);
            if let Some(level) = logger.level {
                node.level = level;
            }
            node.handlers = logger.handlers;
            node.filters = logger.filters;
            node.propagate = logger.propagate;
            node.disabled = false;
        }
        if let Some(root) = built.root {
            if let Some(level) = root.level {
                state.root.level = level;
            }
            state.root.handlers = root.handlers;
            state.root.filters = root.filters;
        }
        for name in children {
            let node = state.node_mut(&name);
            node.level = LogLevel::NOTSET;
            node.handlers.clear();
            node.propagate = true;
        }
        if disable_existing {
            for name in existing {
                state.node_mut(&name).disabled = true;
            }
        }
    }

    /// Installs `handler` the way colored console output is installed: it replaces (when
    /// `reconfigure`) the first console handler found on `logger` or its ancestors, on the
    /// logger owning it, or goes on `logger` itself when there is none.
    ///
    /// Returns false when an existing console handler was kept.
    pub(crate) fn install_console_handler(
        &self,
        logger: &str,
        level: LogLevel,
        handler: Handler,
        reconfigure: bool,
    ) -> bool {
        let mut state = self.write();
        let found = state.chain(logger).find_map(|(owner, node)| {
            let console = node.handlers.iter().find(|h| h.is_console()).cloned();
            let stop = !node.propagate;
            match console {
                Some(console) => Some(Some((owner.to_string(), console))),
                None if stop => Some(None),
                None => None,
            }
        });

        let owner = match found.flatten() {
            Some(_) if !reconfigure => return false,
            Some((owner, existing)) => {
                state
                    .node_mut(&owner)
                    .handlers
                    .retain(|h| !Arc::ptr_eq(h, &existing));
                owner
            }
            None => logger.to_string(),
        };

        if state.effective_level(&owner) > level {
            state.node_mut(&owner).level = level;
        }
        state.node_mut(&owner).handlers.push(Arc::new(handler));
        true
    }

    pub(crate) fn handler_infos(&self, logger: &str) -> Vec<HandlerInfo> {
        self.read()
            .node(logger)
            .map(|node| node.handlers.iter().map(|h| h.info()).collect())
            .unwrap_or_default()
    }

    /// Names of the handlers built from the last declarative configuration.
    pub fn configured_handlers(&self) -> Vec<String> {
        self.read()
            .handlers
            .values()
            .filter_map(|h| h.name().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::console::test::CapturedConsole;
    use crate::logging::handler::HandlerTarget;
    use assert_matches::assert_matches;
    use std::path::PathBuf;
    use tracing_test::traced_test;

    fn registry() -> (LoggingRegistry, CapturedConsole) {
        let console = CapturedConsole::default();
        let registry = LoggingRegistry::builder()
            .console(console.clone())
            .without_colors()
            .build();
        (registry, console)
    }

    fn config(yaml: &str) -> LoggingConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    const HIERARCHY: &str = r#"
version: 1
formatters:
  brief:
    format: "%(name)s %(levelname)s %(message)s"
handlers:
  out:
    class: logging.StreamHandler
    formatter: brief
    stream: ext://sys.stdout
  err:
    class: logging.StreamHandler
    formatter: brief
    level: ERROR
loggers:
  conv_lstm:
    level: DEBUG
    handlers: [out]
  conv_lstm.quiet:
    level: INFO
    handlers: [out]
    propagate: false
root:
  level: WARNING
  handlers: [err]
"#;

    #[test]
    fn ancestors_walk_up_the_dotted_name() {
        assert_eq!(vec!["a.b.c", "a.b", "a"], ancestors("a.b.c").collect::<Vec<_>>());
    }

    #[test]
    fn unconfigured_root_uses_the_last_resort() {
        let (registry, console) = registry();

        registry.dispatch(Record::new("conv_lstm", LogLevel::INFO, "not shown"));
        registry.dispatch(Record::new("conv_lstm", LogLevel::WARNING, "careful"));

        assert_eq!(vec!["careful"], console.lines(ConsoleStream::Stderr));
    }

    #[test]
    fn basic_config_installs_a_stderr_handler_once() {
        let (registry, console) = registry();

        registry.basic_config(LogLevel::INFO);
        registry.basic_config(LogLevel::DEBUG);
        registry.dispatch(Record::new("setup", LogLevel::INFO, "ready"));
        registry.dispatch(Record::new("setup", LogLevel::DEBUG, "not shown"));

        assert_eq!(LogLevel::INFO, registry.root().level());
        assert_eq!(1, registry.root().handlers().len());
        assert_eq!(vec!["INFO:setup:ready"], console.lines(ConsoleStream::Stderr));
    }

    #[test]
    fn records_propagate_up_the_hierarchy() {
        let (registry, console) = registry();
        registry.configure(config(HIERARCHY)).unwrap();

        registry.dispatch(Record::new("conv_lstm.train", LogLevel::DEBUG, "step"));
        registry.dispatch(Record::new("conv_lstm.train", LogLevel::ERROR, "diverged"));

        assert_eq!(
            vec!["conv_lstm.train DEBUG step", "conv_lstm.train ERROR diverged"],
            console.lines(ConsoleStream::Stdout)
        );
        assert_eq!(
            vec!["conv_lstm.train ERROR diverged"],
            console.lines(ConsoleStream::Stderr)
        );
    }

    #[test]
    fn propagation_stops_at_non_propagating_loggers() {
        let (registry, console) = registry();
        registry.configure(config(HIERARCHY)).unwrap();

        registry.dispatch(Record::new("conv_lstm.quiet", LogLevel::DEBUG, "dropped"));
        registry.dispatch(Record::new("conv_lstm.quiet", LogLevel::ERROR, "kept"));

        assert_eq!(
            vec!["conv_lstm.quiet ERROR kept"],
            console.lines(ConsoleStream::Stdout)
        );
        assert!(console.lines(ConsoleStream::Stderr).is_empty());
    }

    #[test]
    fn effective_level_is_inherited() {
        let (registry, _) = registry();
        registry.configure(config(HIERARCHY)).unwrap();

        let state = registry.read();
        assert_eq!(LogLevel::DEBUG, state.effective_level("conv_lstm.train.epoch"));
        assert_eq!(LogLevel::WARNING, state.effective_level("torch"));
        assert_eq!(LogLevel::INFO, state.effective_level("conv_lstm.quiet.inner"));
    }

    #[test]
    fn existing_loggers_are_disabled_by_default() {
        let (registry, console) = registry();
        registry.logger("torch");
        registry.logger("conv_lstm.data");

        registry.configure(config(HIERARCHY)).unwrap();
        registry.dispatch(Record::new("torch", LogLevel::ERROR, "disabled"));
        registry.dispatch(Record::new("conv_lstm.data", LogLevel::INFO, "child"));

        assert!(registry.logger("torch").disabled());
        assert!(!registry.logger("conv_lstm.data").disabled());
        assert_eq!(
            vec!["conv_lstm.data INFO child"],
            console.lines(ConsoleStream::Stdout)
        );
        assert!(console.lines(ConsoleStream::Stderr).is_empty());
    }

    #[test]
    fn existing_loggers_stay_enabled_when_asked() {
        let (registry, _) = registry();
        registry.logger("torch");

        registry
            .configure(config(&HIERARCHY.replace(
                "version: 1",
                "version: 1\ndisable_existing_loggers: false",
            )))
            .unwrap();

        assert!(!registry.logger("torch").disabled());
    }

    #[test]
    fn existing_children_are_reset() {
        let (registry, _) = registry();
        let child = registry.logger("conv_lstm.data");
        child.set_level(LogLevel::ERROR);
        child.set_propagate(false);

        registry.configure(config(HIERARCHY)).unwrap();

        assert_eq!(LogLevel::NOTSET, child.level());
        assert!(child.propagate());
        assert_eq!(LogLevel::DEBUG, child.effective_level());
    }

    #[test]
    fn reconfiguring_drops_previous_handlers() {
        let (registry, _) = registry();
        registry.configure(config(HIERARCHY)).unwrap();

        registry
            .configure(config(
                "version: 1\nhandlers:\n  discard:\n    class: logging.NullHandler\nroot:\n  handlers: [discard]\n",
            ))
            .unwrap();

        assert!(registry.logger("conv_lstm").handlers().is_empty());
        assert_eq!(vec!["discard"], registry.configured_handlers());
        assert_eq!(
            vec![HandlerTarget::Null],
            registry
                .root()
                .handlers()
                .into_iter()
                .map(|h| h.target)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn incremental_configuration_only_changes_levels() {
        let (registry, console) = registry();
        registry.configure(config(HIERARCHY)).unwrap();

        registry
            .configure(config(
                "version: 1\nincremental: true\nhandlers:\n  err:\n    class: logging.NullHandler\n    level: WARNING\nroot:\n  level: ERROR\n",
            ))
            .unwrap();
        registry.dispatch(Record::new("torch", LogLevel::ERROR, "still to stderr"));

        assert_eq!(LogLevel::ERROR, registry.root().level());
        assert_eq!(LogLevel::WARNING, registry.root().handlers()[0].level);
        assert_eq!(
            vec!["torch ERROR still to stderr"],
            console.lines(ConsoleStream::Stderr)
        );
    }

    #[test]
    fn incremental_configuration_of_unknown_handler_fails() {
        let (registry, _) = registry();

        let result = registry.configure(config(
            "version: 1\nincremental: true\nhandlers:\n  missing:\n    class: logging.NullHandler\n",
        ));

        assert_matches!(result, Err(LoggingConfigError::UnknownHandler { handler, .. }) => {
            assert_eq!("missing", handler);
        });
    }

    #[traced_test]
    #[test]
    fn applied_configuration_is_traced() {
        let (registry, _) = registry();

        registry.configure(config("version: 1")).unwrap();

        assert!(logs_contain("Logging configuration applied"));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let (registry, _) = registry();
        assert_matches!(
            registry.configure(config("version: 2")),
            Err(LoggingConfigError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn dangling_references_are_rejected_without_changes() {
        let (registry, _) = registry();
        registry.basic_config(LogLevel::INFO);

        let unknown_formatter = registry.configure(config(
            "version: 1\nhandlers:\n  h:\n    class: logging.StreamHandler\n    formatter: nope\n",
        ));
        let unknown_handler =
            registry.configure(config("version: 1\nroot:\n  handlers: [nope]\n"));
        let unknown_filter = registry.configure(config(
            "version: 1\nloggers:\n  conv_lstm:\n    filters: [nope]\n",
        ));

        assert_matches!(unknown_formatter, Err(LoggingConfigError::UnknownFormatter { .. }));
        assert_matches!(unknown_handler, Err(LoggingConfigError::UnknownHandler { .. }));
        assert_matches!(unknown_filter, Err(LoggingConfigError::UnknownFilter { .. }));
        assert_eq!(1, registry.root().handlers().len());
    }

    #[test]
    fn invalid_format_is_rejected() {
        let (registry, _) = registry();

        let result = registry.configure(config(
            "version: 1\nformatters:\n  f:\n    format: '%(epoch)s'\n",
        ));

        assert_matches!(result, Err(LoggingConfigError::Formatter { formatter, .. }) => {
            assert_eq!("f", formatter);
        });
    }

    #[test]
    fn logger_filters_drop_records() {
        let (registry, console) = registry();
        registry
            .configure(config(
                r#"
version: 1
filters:
  only_data:
    name: conv_lstm.data
handlers:
  out:
    class: logging.StreamHandler
    stream: ext://sys.stdout
root:
  level: INFO
  handlers: [out]
  filters: [only_data]
"#,
            ))
            .unwrap();

        registry.dispatch(Record::new("root", LogLevel::INFO, "root record dropped"));
        registry.dispatch(Record::new("conv_lstm.data", LogLevel::INFO, "child record kept"));

        // Logger filters only apply to records logged on that logger.
        assert_eq!(
            vec!["child record kept"],
            console.lines(ConsoleStream::Stdout)
        );
    }

    #[test]
    fn file_handlers_write_where_configured() {
        let (registry, _) = registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        registry
            .configure(config(&format!(
                "version: 1\nhandlers:\n  file:\n    class: logging.FileHandler\n    filename: {}\nroot:\n  level: INFO\n  handlers: [file]\n",
                path.display()
            )))
            .unwrap();

        registry.dispatch(Record::new("conv_lstm", LogLevel::INFO, "epoch 1"));

        assert_eq!(
            vec![HandlerTarget::File(PathBuf::from(&path))],
            registry
                .root()
                .handlers()
                .into_iter()
                .map(|h| h.target)
                .collect::<Vec<_>>()
        );
        assert_eq!("epoch 1\n", std::fs::read_to_string(&path).unwrap());
    }

    fn rotating_config(path: &std::path::Path, backup_count: u32) -> LoggingConfig {
        config(&format!(
            r#"
version: 1
handlers:
  rotating:
    class: logging.handlers.RotatingFileHandler
    filename: {}
    maxBytes: 15
    backupCount: {backup_count}
root:
  level: INFO
  handlers: [rotating]
"#,
            path.display()
        ))
    }

    #[test]
    fn rotating_file_handler_rolls_over_into_numbered_backups() {
        let (registry, _) = registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.log");
        registry.configure(rotating_config(&path, 1)).unwrap();

        for index in 1..=6 {
            let message = format!("record-{index:02}");
            registry.dispatch(Record::new("conv_lstm", LogLevel::INFO, message));
        }

        let backup = std::fs::read_to_string(dir.path().join("info.log.1")).unwrap();
        let current = std::fs::read_to_string(&path).unwrap();
        assert!(format!("{backup}{current}").ends_with("record-06\n"));
        assert!(!format!("{backup}{current}").contains("record-01"));
        assert!(!dir.path().join("info.log.2").exists());
    }

    #[test]
    fn rotating_file_handler_without_backups_keeps_every_record() {
        let (registry, _) = registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.log");
        registry.configure(rotating_config(&path, 0)).unwrap();

        for index in 1..=3 {
            let message = format!("record-{index:02}");
            registry.dispatch(Record::new("conv_lstm", LogLevel::INFO, message));
        }

        assert_eq!(
            "record-01\nrecord-02\nrecord-03\n",
            std::fs::read_to_string(&path).unwrap()
        );
        assert!(!dir.path().join("info.log.1").exists());
    }

    #[test]
    fn console_handler_replaces_the_first_console_handler_found() {
        let (registry, console) = registry();
        registry.configure(config(HIERARCHY)).unwrap();

        let installed = registry.install_console_handler(
            "conv_lstm.quiet",
            LogLevel::INFO,
            Handler::console(
                ConsoleStream::Stderr,
                Arc::new(console.clone()),
                LogLevel::INFO,
                RecordFormat::default(),
                Arc::new(PlainStyle),
            ),
            true,
        );

        assert!(installed);
        let quiet = registry.logger("conv_lstm.quiet").handlers();
        assert_eq!(1, quiet.len());
        assert_eq!(None, quiet[0].name);
        assert_eq!(HandlerTarget::Console(ConsoleStream::Stderr), quiet[0].target);
        // `out` is still attached to `conv_lstm`.
        assert_eq!(1, registry.logger("conv_lstm").handlers().len());
    }

    #[test]
    fn console_handler_is_kept_without_reconfigure() {
        let (registry, console) = registry();
        registry.basic_config(LogLevel::WARNING);

        let installed = registry.install_console_handler(
            "conv_lstm.None",
            LogLevel::INFO,
            Handler::console(
                ConsoleStream::Stderr,
                Arc::new(console.clone()),
                LogLevel::INFO,
                RecordFormat::default(),
                Arc::new(PlainStyle),
            ),
            false,
        );

        assert!(!installed);
        assert_eq!(LogLevel::WARNING, registry.root().level());
        assert!(registry.logger("conv_lstm.None").handlers().is_empty());
    }

    #[test]
    fn console_handler_lowers_the_owner_level() {
        let (registry, console) = registry();
        registry.basic_config(LogLevel::WARNING);

        registry.install_console_handler(
            "conv_lstm.None",
            LogLevel::INFO,
            Handler::console(
                ConsoleStream::Stderr,
                Arc::new(console.clone()),
                LogLevel::INFO,
                RecordFormat::default(),
                Arc::new(PlainStyle),
            ),
            true,
        );

        assert_eq!(LogLevel::INFO, registry.root().level());
        assert_eq!(1, registry.root().handlers().len());
        assert_eq!(None, registry.root().handlers()[0].name);
    }
}
