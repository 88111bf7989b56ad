use anyhow::Context;
use configuration::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "clinic.log";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`. When `logging.directory` is set a
/// second, non-blocking layer writes to a daily rolling file; the returned
/// guard must be held until shutdown or buffered lines are lost.
pub fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level.trim()))
        .with_context(|| format!("invalid logging.level '{}'", settings.level))?;

    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match settings.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}
