use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; with `debug` enabled it
/// becomes `debug` and `RUST_LOG` may override it.
///
/// Logs go to stderr so that translated text on stdout stays clean.
pub fn init(debug: bool) {
    // Without debug the level is forced, so a stray RUST_LOG in the user's
    // environment cannot turn on request logging.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
