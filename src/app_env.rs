use anyhow::{Context, anyhow};
use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the task backend's API, including any version prefix (e.g. http://127.0.0.1:8000/api/v1)
pub const API_URL: &str = "TASKBOARD_API_URL";
/// Path to the file holding the bearer token of the current session
pub const SESSION_FILE: &str = "TASKBOARD_SESSION_FILE";
/// Number of seconds to wait on a single backend request before giving up
pub const HTTP_TIMEOUT_SECS: &str = "TASKBOARD_HTTP_TIMEOUT_SECS";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Usually http://localhost:4317 when an OpenTelemetry collector
/// runs next to the client. Exporting is disabled unless this and [OTEL_METRIC_EXPORT_URL] are set.
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Usually http://localhost:4317 when an OpenTelemetry collector
/// runs next to the client.
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Endpoints for exporting OpenTelemetry data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtelEndpoints {
    pub traces: String,
    pub metrics: String,
}

/// Runtime configuration of the client
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub otel: Option<OtelEndpoints>,
}

impl Settings {
    /// Reads settings from the process environment
    pub fn from_env() -> Result<Settings, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults for absent keys
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = Url::parse(&raw_url).with_context(|| format!("parsing {API_URL}"))?;

        let session_file = match lookup(SESSION_FILE) {
            Some(path) => PathBuf::from(path),
            None => default_session_file(lookup("HOME")),
        };

        let request_timeout = match lookup(HTTP_TIMEOUT_SECS) {
            Some(secs) => {
                let secs: u64 = secs
                    .trim()
                    .parse()
                    .with_context(|| format!("parsing {HTTP_TIMEOUT_SECS}"))?;
                if secs == 0 {
                    return Err(anyhow!("{HTTP_TIMEOUT_SECS} must be greater than zero"));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let otel = match (lookup(OTEL_SPAN_EXPORT_URL), lookup(OTEL_METRIC_EXPORT_URL)) {
            (Some(traces), Some(metrics)) => Some(OtelEndpoints { traces, metrics }),
            _ => None,
        };

        Ok(Settings {
            api_url,
            session_file,
            request_timeout,
            otel,
        })
    }
}

fn default_session_file(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home).join(".taskboard").join("session.json"),
        None => PathBuf::from(".taskboard-session.json"),
    }
}
