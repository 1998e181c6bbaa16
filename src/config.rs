use tracing::warn;
use url::Url;

use crate::error::ApiError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
const DEV_ORIGINS: [&str; 2] = ["http://127.0.0.1:5173", "http://localhost:5173"];

/// Server settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    /// Normalized `scheme://host[:port]` origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_values(
            std::env::var("APP_ADDR").ok(),
            std::env::var("PORT").ok(),
            std::env::var("ALLOWED_ORIGINS").ok(),
        )
    }

    pub fn from_values(
        app_addr: Option<String>,
        port: Option<String>,
        allowed_origins: Option<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            bind_addr: resolve_bind_addr(app_addr.as_deref(), port.as_deref()),
            allowed_origins: parse_allowed_origins(allowed_origins.as_deref())?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: DEV_ORIGINS.iter().map(ToString::to_string).collect(),
        }
    }
}

fn resolve_bind_addr(app_addr: Option<&str>, port: Option<&str>) -> String {
    if let Some(configured) = app_addr.and_then(non_empty) {
        return configured.to_string();
    }

    if let Some(port) = port.and_then(|value| value.trim().parse::<u16>().ok()) {
        return format!("0.0.0.0:{port}");
    }

    DEFAULT_BIND_ADDR.to_string()
}

fn parse_allowed_origins(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    let configured = raw
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if configured.is_empty() {
        warn!("ALLOWED_ORIGINS is not set. Falling back to development origins.");
        return Ok(DEV_ORIGINS.iter().map(ToString::to_string).collect());
    }

    let mut origins = Vec::with_capacity(configured.len());
    for origin in &configured {
        let normalized = normalize_origin(origin).ok_or_else(|| {
            ApiError::internal(format!(
                "Invalid origin in ALLOWED_ORIGINS: {origin}. Use values like https://example.com"
            ))
        })?;
        if !origins.contains(&normalized) {
            origins.push(normalized);
        }
    }

    Ok(origins)
}

/// Reduces an origin to `scheme://host[:port]`, dropping default ports.
pub fn normalize_origin(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let scheme = parsed.scheme();
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };

    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return None;
    }

    match parsed.port() {
        Some(port) if port != default_port => Some(format!("{scheme}://{host}:{port}")),
        _ => Some(format!("{scheme}://{host}")),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
