use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// Modules to filter out from logging when not in Trace mode.
/// The HTTP stack logs every chunk of a long-lived stream at debug level,
/// which drowns out the per-session lines.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "tracing", "hyper", "hyper_util", "axum"];

pub struct Logger {}

impl Logger {
    /// Initializes the global logger with configuration based on the provided Config.
    ///
    /// When the log level is set to Trace, all logs including dependency logs are shown.
    /// For all other log levels, verbose dependency logs are filtered out.
    /// Fails if a global logger has already been installed.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let log_level_filter = Self::convert_level_filter(config.log_level_filter);
        let apply_filters = Self::should_filter_dependencies(config.log_level_filter);
        let log_config = Self::build_log_config(apply_filters);

        simplelog::TermLogger::init(
            log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_modules_cover_the_http_stack() {
        for module in ["hyper", "axum", "tower_http"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
        assert!(
            !FILTERED_MODULES.contains(&"sse"),
            "session logs must never be filtered"
        );
    }

    #[test]
    fn test_only_trace_level_disables_filtering() {
        assert!(!Logger::should_filter_dependencies(LevelFilter::Trace));
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(Logger::should_filter_dependencies(level), "{level} should filter");
        }
    }

    #[test]
    fn test_build_log_config_does_not_panic() {
        let _filtered = Logger::build_log_config(true);
        let _unfiltered = Logger::build_log_config(false);
    }

    #[test]
    fn test_convert_level_filter_preserves_ordering() {
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Warn) as u8,
            simplelog::LevelFilter::Warn as u8
        );
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Trace) as u8,
            simplelog::LevelFilter::Trace as u8
        );
    }
}
