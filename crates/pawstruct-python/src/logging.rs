use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    util::TryInitError,
};

pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Installs a global stderr subscriber. Fails if the host process already installed one.
pub fn setup_logging(verbosity: u8, quiet: bool) -> Result<(), TryInitError> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer)
        .try_init()
}
