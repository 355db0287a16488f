//! Logging setup for the Shabbat times service.
//!
//! All crates log through `tracing` macros; the binary calls [`init`] or
//! [`init_with_level`] once at startup. `RUST_LOG` still wins over the level
//! passed in, so `RUST_LOG=shabbat_reminders=trace` works as expected.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the subscriber with a default level for the `shabbat*` targets.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("shabbat={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    // try_init: tests and embedded callers may already have a global subscriber
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    tracing::error!("{}: {}", context, error);
}
