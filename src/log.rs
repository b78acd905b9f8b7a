// src/log.rs
use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr subscriber. Lines are stamped with time since start.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this twice is harmless.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::uptime())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
