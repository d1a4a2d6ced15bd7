use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Logger configuration for binaries embedding the engine.
///
/// `env_filter` uses `tracing_subscriber::EnvFilter` syntax (e.g. `"info"` or
/// `"textbehind=debug,warn"`). When unset, `RUST_LOG` is consulted, then `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Explicit filter directive.
    pub env_filter: Option<String>,
    /// Emit ANSI colors.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Return a config with an explicit filter directive.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> EnvFilter {
        if let Some(directive) = self.env_filter.as_deref() {
            match EnvFilter::try_new(directive) {
                Ok(f) => return f,
                Err(e) => eprintln!("ignoring invalid log filter '{directive}': {e}"),
            }
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

static INIT: Once = Once::new();

/// Install the global `tracing` subscriber (stderr, fmt layer).
///
/// Idempotent; later calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(config.filter())
            .with_ansi(config.ansi)
            .with_writer(std::io::stderr)
            .try_init();
        if installed.is_ok() {
            tracing::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/logging.rs"]
mod tests;
