use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONSOLE_LEVEL: &str = "warn";

/// Installs the console logger. `RUST_LOG` overrides the default level; records emitted through
/// the `log` macros are forwarded to it as well.
pub fn initialize_logger() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish()
        .try_init()
}
