use env_logger::Env;

/// Install the process-wide logger.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` for the
/// vexchat crates and everything else stays at `warn`.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,vexchat=debug,vexchat_session=debug,vexchat_api=debug"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(verbose)
        .init();
}
