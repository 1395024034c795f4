//! Logging setup for the command-line front-end.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

const DEFAULT_FILTER: &str = "totp_engine=info,totp=info";

/// Install the global subscriber, honouring `RUST_LOG` when set.
///
/// Logs go to stderr so codes and URIs printed on stdout stay pipeable.
pub fn init_logging() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
}
