use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// `RUST_LOG` wins over the configured default level.
pub fn init_logging(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
