use super::record::{logger_name, Record};
use super::registry::LoggingRegistry;
use crate::config::level::LogLevel;
use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

// Callsites of records bridged from the `log` crate share this target. Their real target is
// only known once the event is normalized.
const LOG_BRIDGE_TARGET: &str = "log";

/// Routes `tracing` events to the loggers of a [LoggingRegistry]. The event target names the
/// logger, with `::` turned into `.`.
#[derive(Debug, Clone)]
pub struct RegistryLayer {
    registry: LoggingRegistry,
}

impl RegistryLayer {
    pub fn new(registry: LoggingRegistry) -> Self {
        Self { registry }
    }
}

impl<S> Layer<S> for RegistryLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    // Levels change at runtime, so nothing can be cached per callsite.
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        if !metadata.is_event() || metadata.target() == LOG_BRIDGE_TARGET {
            return true;
        }
        self.registry.read().is_enabled_for(
            &logger_name(metadata.target()),
            LogLevel::from(*metadata.level()),
        )
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let normalized = event.normalized_metadata();
        let metadata = normalized.as_ref().unwrap_or_else(|| event.metadata());
        let func_name = ctx.event_span(event).map(|span| span.name());
        self.registry
            .dispatch(Record::from_event(event, metadata, func_name));
    }
}
