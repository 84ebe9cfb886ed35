//! Imvc - command-line host for immediate value expressions.
//!
//! The binary evaluates single expressions (`imvc eval`) and runs scripts of
//! variable commands (`imvc run`) against an in-memory store. The pieces it
//! is built from live here so they can be tested without a process.

mod host;
pub mod script;

use std::sync::Once;

pub use host::SystemHost;
pub use script::{parse_command, Command, LineError, ScriptError, ScriptRunner};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=imv_eval=debug` or `RUST_LOG=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
