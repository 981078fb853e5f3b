// Session tracing and log setup
//
// `trace` keeps the structured per-session event log that is persisted next
// to each structured output; `init_tracing` wires up `tracing` diagnostics.

pub mod trace;

pub use trace::{SessionTrace, TraceEntry, TraceEvent};

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug`, else `warn`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bugscribe={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
