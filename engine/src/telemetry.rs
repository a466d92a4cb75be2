use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `verbosity` 0 shows warnings, 1 info,
/// 2 debug, 3+ trace; `RUST_LOG` wins when set. Calling it twice is harmless.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
