use std::sync::OnceLock;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` directive syntax, for example
/// `"warn,prism_engine=debug"`. When it is `None`, `RUST_LOG` is consulted,
/// and `default_level` applies when neither is set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs the global logger.
///
/// Only the first call does anything; later calls return the first call's
/// outcome. Returns `false` when some other logger was already registered
/// with `log` (a test harness, for instance).
pub fn init_logging(config: LoggingConfig) -> bool {
    *INSTALLED.get_or_init(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let logger = build_logger(&config, rust_log.as_deref());
        let max_level = logger.filter();

        if log::set_boxed_logger(Box::new(logger)).is_err() {
            return false;
        }
        log::set_max_level(max_level);
        log::debug!("logging initialized at {max_level}");
        true
    })
}

fn build_logger(config: &LoggingConfig, rust_log: Option<&str>) -> env_logger::Logger {
    let mut builder = env_logger::Builder::new();

    match config.env_filter.as_deref().or(rust_log) {
        Some(filter) => builder.parse_filters(filter),
        None => builder.filter_level(config.default_level),
    };

    builder.write_style(config.write_style);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(env_filter: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            env_filter: env_filter.map(str::to_string),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn explicit_filter_beats_rust_log() {
        let logger = build_logger(&config(Some("warn")), Some("trace"));
        assert_eq!(logger.filter(), LevelFilter::Warn);
    }

    #[test]
    fn rust_log_is_used_without_explicit_filter() {
        let logger = build_logger(&config(None), Some("debug"));
        assert_eq!(logger.filter(), LevelFilter::Debug);
    }

    #[test]
    fn default_level_applies_when_nothing_is_set() {
        assert_eq!(build_logger(&config(None), None).filter(), LevelFilter::Info);

        let quiet = LoggingConfig {
            default_level: LevelFilter::Error,
            ..LoggingConfig::default()
        };
        assert_eq!(build_logger(&quiet, None).filter(), LevelFilter::Error);
    }

    #[test]
    fn module_directives_raise_the_max_level() {
        let logger = build_logger(&config(Some("warn,prism_engine=trace")), None);
        assert_eq!(logger.filter(), LevelFilter::Trace);
    }

    #[test]
    fn repeated_init_keeps_the_first_outcome() {
        let first = init_logging(config(Some("info")));
        let second = init_logging(config(Some("trace")));
        assert_eq!(first, second);
    }
}
