//! Logging and tracing initialization.
//!
//! A bare level such as `"debug"` applies to the Wiscreen crates only; other
//! crates stay at `warn`. Anything containing a target (`=`) or several
//! directives (`,`) is passed to [`EnvFilter`] unchanged. `RUST_LOG` always
//! takes precedence.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Level used before the configuration is known.
const BOOTSTRAP_LEVEL: &str = "warn";

/// Expand a configured level into filter directives.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("warn,wiscreen={level}")
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(level)))
}

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(&config.level))
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_target(true).finish())
    };
    if installed.is_err() {
        tracing::debug!("Global subscriber already set");
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

/// Run `f` with a temporary stderr subscriber at `warn`.
///
/// Covers the window before [`init_logging`] can run, such as loading the
/// configuration that decides how logging is set up.
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter(BOOTSTRAP_LEVEL))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}
