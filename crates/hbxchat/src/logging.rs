//! Process-wide `tracing` setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Maps a user-supplied level name to a filter.
///
/// Accepts `trace`, `debug`, `info`, `warn`, `error` in any case, and
/// `off`. Anything else means `info`.
pub fn level_filter(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Installs a global formatting subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used. Calling this more
/// than once is harmless, later calls are ignored.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy();

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level, "tracing initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_is_case_insensitive() {
        assert_eq!(level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(level_filter("Warn"), LevelFilter::WARN);
        assert_eq!(level_filter("trace"), LevelFilter::TRACE);
    }

    #[test]
    fn test_level_filter_unknown_defaults_to_info() {
        assert_eq!(level_filter(""), LevelFilter::INFO);
        assert_eq!(level_filter("verbose"), LevelFilter::INFO);
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing("error");
        init_tracing("debug");
    }
}
