//! Tracing subscriber setup for the server binary.

use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Build the level filter from `RUST_LOG`-style directives
/// (`debug`, `posts_api=debug,tower_http=info`, ...).
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global fmt subscriber. `log` records from the library are
/// bridged in through tracing-subscriber's `tracing-log` support.
pub fn init_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_target(true)
        .with_thread_ids(true)
        .init();
}
