use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Levels from silent to chatty; `-v` and `-q` move along this list
const LEVELS: [LevelFilter; 6] = [
    LevelFilter::OFF,
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];
const DEFAULT_LEVEL_INDEX: usize = 3;

/// Default log level for the given `-v`/`-q` counts
///
/// When ciphertext or plaintext goes to stdout nothing is logged at all.
pub fn log_level(verbose: u8, quiet: u8, stdout_mode: bool) -> LevelFilter {
    if stdout_mode {
        return LevelFilter::OFF;
    }
    let index = (DEFAULT_LEVEL_INDEX + verbose as usize)
        .saturating_sub(quiet as usize)
        .min(LEVELS.len() - 1);
    LEVELS[index]
}

/// Install the stderr logger and panic hook
///
/// The returned guard flushes buffered log lines when dropped and must outlive
/// every log call. Returns `None` when logging is off.
pub fn init_logging(level: LevelFilter) -> Option<WorkerGuard> {
    if level == LevelFilter::OFF {
        return None;
    }

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
    register_panic_logger();

    Some(stderr_guard)
}

/// Registers a panic hook that logs panics using the `tracing` crate
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_info() {
        assert_eq!(log_level(0, 0, false), LevelFilter::INFO);
    }

    #[test]
    fn test_verbosity_moves_level() {
        assert_eq!(log_level(1, 0, false), LevelFilter::DEBUG);
        assert_eq!(log_level(9, 0, false), LevelFilter::TRACE);
        assert_eq!(log_level(0, 2, false), LevelFilter::WARN);
        assert_eq!(log_level(0, 9, false), LevelFilter::OFF);
        assert_eq!(log_level(2, 2, false), LevelFilter::INFO);
    }

    #[test]
    fn test_stdout_mode_silences() {
        assert_eq!(log_level(3, 0, true), LevelFilter::OFF);
    }
}
