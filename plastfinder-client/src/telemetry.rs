//! Tracing setup for the CLI.

use crate::error::{ClientError, ClientResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// Results go to stdout, so logs stay out of the way. The filter comes from
/// `RUST_LOG` and defaults to `warn`.
pub fn init_tracing(json: bool) -> ClientResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| ClientError::config(format!("tracing: {e}")))
}
