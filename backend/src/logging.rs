//! Logging initialization for the search binaries.
//!
//! `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches the
//! console output to one JSON object per line.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or("info".to_string()),
            json: std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")),
        }
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "backend={},search_index={},reqwest=warn,hyper=warn",
            config.level, config.level
        ))
    })
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry().with(build_env_filter(config));
    if config.json {
        let console_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr);
        subscriber.with(console_layer).try_init()?;
    } else {
        let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
        subscriber.with(console_layer).try_init()?;
    }
    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}
