//! Utilities for the demo host: logging setup with a dynamic level.
//!
//! Key items:
//!   derive_level / init_logging

use tracing_subscriber::filter::LevelFilter;

/// Map `-v` count and `-q` onto a level: quiet -> ERROR, 0 -> INFO, 1 -> DEBUG, 2+ -> TRACE.
pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the stderr fmt subscriber. A second call is a no-op.
pub fn init_logging(level: LevelFilter) {
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_follows_flags() {
        assert_eq!(derive_level(0, false), LevelFilter::INFO);
        assert_eq!(derive_level(1, false), LevelFilter::DEBUG);
        assert_eq!(derive_level(5, false), LevelFilter::TRACE);
        assert_eq!(derive_level(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LevelFilter::ERROR);
        init_logging(LevelFilter::TRACE);
    }
}
