//! Log subscriber setup.
//!
//! Everything goes to stderr: stdout carries the MCP stdio transport and the
//! one-shot CLI output.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn running_under_test() -> bool {
    std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok()
}

/// Installs the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG` takes precedence; otherwise INFO, or DEBUG under a test runner.
pub fn init() {
    INIT.call_once(|| {
        let is_test = running_under_test();
        let default_level = if is_test { Level::DEBUG } else { Level::INFO };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .compact();

        let result = if is_test {
            builder.with_test_writer().try_init()
        } else {
            builder.with_writer(std::io::stderr).try_init()
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize logging: {}", e);
        }
    });
}
