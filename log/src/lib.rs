use std::env;
use std::sync::Mutex;

use slog::{Drain, Fuse, Level};
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Logger};

/// The environment variable holding the minimum level to emit.
pub const LEVEL_VARIABLE: &str = "IRONLOG_LOG_LEVEL";

/// Builds the root logger at the level named by [`LEVEL_VARIABLE`].
pub fn initialize_logger() -> Logger {
    initialize_logger_at(parse_level(env::var(LEVEL_VARIABLE).ok().as_deref()))
}

/// Builds the root logger: JSON lines on stderr, written from a
/// background thread.
pub fn initialize_logger_at(level: Level) -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain);

    let drain = Async::new(drain).build().fuse();
    let drain = drain.filter_level(level).fuse();

    Logger::root(
        drain,
        o!(
            "service" => info::SERVICE_NAME,
            "version" => info::VERSION,
            "revision" => info::REVISION,
            "build_timestamp" => info::BUILD_TIMESTAMP
        ),
    )
}

/// A logger that swallows everything, for tests and embedding.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// Parses a level name, falling back to `info` for anything unrecognized.
pub fn parse_level(raw: Option<&str>) -> Level {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or(Level::Info)
}

#[cfg(test)]
mod tests {
    use slog::Level;

    use super::parse_level;

    #[test]
    fn recognizes_level_names() {
        assert_eq!(parse_level(Some("debug")), Level::Debug);
        assert_eq!(parse_level(Some(" warn ")), Level::Warning);
        assert_eq!(parse_level(Some("trace")), Level::Trace);
    }

    #[test]
    fn falls_back_to_info() {
        assert_eq!(parse_level(None), Level::Info);
        assert_eq!(parse_level(Some("loud")), Level::Info);
    }
}
