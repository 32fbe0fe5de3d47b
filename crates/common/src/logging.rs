//! Logging and tracing initialization.

use crate::config::LoggingConfig;

/// Target prefix shared by every PosterKit crate.
const CRATE_TARGET: &str = "posterkit";

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Filter directives for a configured level.
///
/// A bare level applies to PosterKit crates only; dependencies stay at
/// `warn`. Anything containing explicit directives is used verbatim.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return format!("warn,{CRATE_TARGET}=info");
    }
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    format!("warn,{CRATE_TARGET}={level}")
}
