//! Log output for the binary.
//!
//! Library code only emits `tracing` events; this installs the subscriber.
//! `RUST_LOG` wins when set, otherwise `-q`/`-v` pick the level.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given verbosity flags.
pub fn default_directive(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn,vidscribe=info",
        1 => "warn,vidscribe=debug",
        _ => "debug",
    }
}

/// Install a stderr subscriber. Safe to call more than once; later calls are ignored.
pub fn init(quiet: bool, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));

    let result = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(verbose > 1)
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
