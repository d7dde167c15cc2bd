use flix_core::LlmConfig;
use std::time::Duration;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const DEFAULT_LOG_FILTER: &str = "flix_service=debug,flix_core=debug,tower_http=debug";

/// Log output selected by `LOG_FORMAT`; anything but `pretty` means JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

/// Configuration for the recommendation service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub llm: LlmConfig,
    pub port: u16,
    pub log_format: LogFormat,
    /// Form sessions untouched for this long are discarded
    pub session_ttl: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm = LlmConfig::from_lookup(&lookup)?;
        let port = lookup("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let log_format = lookup("LOG_FORMAT")
            .map(|name| LogFormat::from_name(&name))
            .unwrap_or_default();
        let session_ttl = lookup("SESSION_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TTL_SECS));

        Ok(Self {
            llm,
            port,
            log_format,
            session_ttl,
        })
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(log_format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let output = match log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(env_filter)
        .init();
}
