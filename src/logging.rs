//! Console logging setup

use tracing_subscriber::EnvFilter;

/// Initialize compact stderr logging.
///
/// `RUST_LOG` wins when set; otherwise verbosity maps 0 → info, 1 → debug,
/// 2+ → trace for this crate.
pub fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "sonar_portfolio=debug,info",
        _ => "sonar_portfolio=trace,debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
