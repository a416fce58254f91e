use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: RUST_LOG filter (default "info"), logs on
/// stderr so command output on stdout stays clean. Safe to call twice.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_target(false).with_writer(io::stderr);

    // Another subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialised twice without panicking");
    }
}
