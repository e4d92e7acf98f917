//! `tracing` init, idempotent so the CLI binary and library tests can both
//! call it without tripping `tracing_subscriber`'s "already set" panic.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `tracing_subscriber::fmt` layer honoring `RUST_LOG`, defaulting
/// to `info` when unset. Safe to call more than once per process.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::INFO.into()),
            )
            .with_target(false)
            .init();
    });
}
