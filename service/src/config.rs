use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use sse::{Event, PayloadFormat, StreamConfig};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Profile names, also used as registry keys and in log lines.
pub const COUNTER_PROFILE: &str = "counter";
pub const TEST_PROFILE: &str = "test";
pub const POSTMAN_PROFILE: &str = "postman";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that are allowed to open streams. A single
    /// `*` allows any origin.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "*"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// First value sent on the open-ended `/stream` endpoint
    #[arg(long, env, default_value_t = 18)]
    pub counter_start: i64,

    /// Milliseconds between events on `/stream`
    #[arg(long, env, default_value_t = 3000)]
    pub counter_interval_ms: u64,

    /// Send a heartbeat comment before the first `/stream` event
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub counter_heartbeat: bool,

    /// Number of messages sent on `/stream/test` before it ends
    #[arg(long, env, default_value_t = 10)]
    pub test_max_events: u64,

    /// Milliseconds between events on `/stream/test`
    #[arg(long, env, default_value_t = 2000)]
    pub test_interval_ms: u64,

    /// Number of messages sent on `/stream/postman` before it ends
    #[arg(long, env, default_value_t = 15)]
    pub postman_max_events: u64,

    /// Milliseconds between events on `/stream/postman`
    #[arg(long, env, default_value_t = 2000)]
    pub postman_interval_ms: u64,

    /// Length of the filler frame sent after each `/stream/postman` event; 0 disables it
    #[arg(long, env, default_value_t = 50)]
    pub postman_padding_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }

    /// Open-ended counter stream: one bare number per event, forever.
    pub fn counter_stream(&self) -> StreamConfig {
        let mut config = StreamConfig::new(COUNTER_PROFILE)
            .counter_from(self.counter_start, 1)
            .interval(Duration::from_millis(self.counter_interval_ms));
        if self.counter_heartbeat {
            config = config.preamble(Event::heartbeat());
        }
        config
    }

    /// Bounded stream for manual testing with a greeting and closing notice.
    pub fn test_stream(&self) -> StreamConfig {
        StreamConfig::new(TEST_PROFILE)
            .counter_from(1, 1)
            .max_events(self.test_max_events)
            .interval(Duration::from_millis(self.test_interval_ms))
            .preamble(Event::heartbeat())
            .preamble(Event::data("Connected to SSE stream"))
            .payload(PayloadFormat::Template("Message number: {count}".to_string()))
            .terminal_notice("Stream ended")
            .cancel_notice("Stream cancelled")
    }

    /// Bounded JSON stream for clients that buffer small chunks (e.g. Postman).
    pub fn postman_stream(&self) -> StreamConfig {
        let mut config = StreamConfig::new(POSTMAN_PROFILE)
            .counter_from(1, 1)
            .max_events(self.postman_max_events)
            .interval(Duration::from_millis(self.postman_interval_ms))
            .preamble(Event::data("Starting SSE stream..."))
            .preamble(Event::data("This is designed for Postman"))
            .preamble(Event::data("Connection established"))
            .preamble(Event::data("Ready to stream data"))
            .payload(PayloadFormat::JsonMessage("Counter: {count}".to_string()))
            .terminal_notice("Stream completed!")
            .cancel_notice("Stream was cancelled");
        if self.postman_padding_len > 0 {
            config = config.padding(self.postman_padding_len);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("event_stream_server").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_describe_the_three_profiles() {
        let config = parse(&[]);

        let counter = config.counter_stream();
        assert_eq!(counter.name, COUNTER_PROFILE);
        assert_eq!(counter.initial_counter, 18);
        assert_eq!(counter.max_events, None);
        assert_eq!(counter.interval, Duration::from_secs(3));
        assert_eq!(counter.preamble_events, vec![Event::heartbeat()]);

        let test = config.test_stream();
        assert_eq!(test.max_events, Some(10));
        assert_eq!(test.interval, Duration::from_secs(2));
        assert_eq!(test.terminal_notice, "Stream ended");
        assert_eq!(test.cancel_notice.as_deref(), Some("Stream cancelled"));

        let postman = config.postman_stream();
        assert_eq!(postman.max_events, Some(15));
        assert_eq!(postman.padding, Some(50));
        assert_eq!(postman.preamble_events.len(), 4);

        for profile in [counter, test, postman] {
            assert!(profile.validate().is_ok(), "{} is invalid", profile.name);
        }
    }

    #[test]
    fn test_heartbeat_and_padding_can_be_switched_off() {
        let config = parse(&["--counter-heartbeat", "false", "--postman-padding-len", "0"]);

        assert!(!config.counter_stream().send_preamble);
        assert_eq!(config.postman_stream().padding, None);
    }

    #[test]
    fn test_overrides_reach_the_profiles() {
        let config = parse(&["--test-max-events", "3", "--test-interval-ms", "0"]);
        let test = config.test_stream();

        assert_eq!(test.max_events, Some(3));
        assert!(test.interval.is_zero());
    }

    #[test]
    fn test_allowed_origins_wildcard() {
        assert!(parse(&[]).allows_any_origin());

        let config = parse(&["--allowed-origins", "http://localhost:3000,https://example.com"]);
        assert!(!config.allows_any_origin());
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
        assert_eq!(RustEnv::Development.to_string(), "development");
    }
}
