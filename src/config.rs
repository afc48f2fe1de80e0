//! Tap configuration
//!
//! Settings come from a JSON/YAML file, an inline JSON string, and/or
//! `TAP_POWERBI_METADATA_*` environment variables. When several sources are
//! given they are layered: env, then file, then inline, later keys winning.

use crate::auth::{AuthConfig, DEFAULT_AUTH_BASE_URL};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{parse_utc_timestamp, JsonObject};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default admin API base
pub const DEFAULT_API_BASE_URL: &str = "https://api.powerbi.com/v1.0/myorg";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "TAP_POWERBI_METADATA_";

/// Upper bound of `lookback_days`, about a century
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

const NUMERIC_KEYS: &[&str] = &[
    "lookback_days",
    "max_retries",
    "timeout_secs",
    "requests_per_second",
];

/// Where to read configuration from
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// JSON or YAML file
    pub file: Option<PathBuf>,
    /// Inline JSON
    pub inline: Option<String>,
    /// Read `TAP_POWERBI_METADATA_*` variables
    pub env: bool,
}

/// Configuration of the tap
#[derive(Clone, Deserialize)]
pub struct TapConfig {
    /// Azure AD tenant
    #[serde(default)]
    pub tenant_id: String,
    /// Application (client) ID
    #[serde(default)]
    pub client_id: String,
    /// Account with Power BI admin rights
    #[serde(default)]
    pub username: String,
    /// Password of that account
    #[serde(default)]
    pub password: String,
    /// First day to read when no state exists (ISO-8601)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Admin API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Identity provider base URL
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    /// Days to look back when neither state nor `start_date` is set
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Client-side request rate cap
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// Override for the User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_auth_base_url() -> String {
    DEFAULT_AUTH_BASE_URL.to_string()
}

fn default_lookback_days() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    10
}

impl TapConfig {
    /// Load, layer and validate configuration from the given sources
    pub fn load(sources: &ConfigSources) -> Result<Self> {
        let mut merged = JsonObject::new();

        if sources.env {
            merged.extend(env_object(std::env::vars()));
        }
        if let Some(path) = &sources.file {
            merged.extend(read_file_object(path)?);
        }
        if let Some(inline) = &sources.inline {
            merged.extend(parse_object(inline, "inline config")?);
        }

        if merged.is_empty() {
            return Err(Error::config(
                "no configuration given; use --config, --config-json or --config-env",
            ));
        }

        Self::from_value(Value::Object(merged))
    }

    /// Build from a JSON value and validate
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Build from a JSON string and validate
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(Value::Object(parse_object(json, "config JSON")?))
    }

    /// Build from a config file and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_value(Value::Object(read_file_object(path.as_ref())?))
    }

    /// Build from `TAP_POWERBI_METADATA_*` pairs and validate
    pub fn from_env_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_value(Value::Object(env_object(vars)))
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        if let Some(start) = &self.start_date {
            if parse_utc_timestamp(start).is_none() {
                return Err(Error::invalid_value(
                    "start_date",
                    format!("'{start}' is not an ISO-8601 date or timestamp"),
                ));
            }
        }

        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(Error::invalid_value(
                "lookback_days",
                format!("must be at most {MAX_LOOKBACK_DAYS}"),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be greater than zero",
            ));
        }

        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("auth_base_url", &self.auth_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::invalid_value(field, format!("'{value}': {e}")))?;
        }

        Ok(())
    }

    /// Parsed `start_date`
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(parse_utc_timestamp)
    }

    /// Where a sync begins when state has nothing: `start_date`, else the lookback window
    pub fn default_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.start_datetime().unwrap_or_else(|| {
            now.checked_sub_signed(Duration::days(i64::from(self.lookback_days)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        })
    }

    /// HTTP client settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.api_base_url)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .rate_limit(RateLimiterConfig::per_second(self.requests_per_second));
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Password-grant settings for the tenant's token endpoint
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::active_directory(
            &self.auth_base_url,
            &self.tenant_id,
            &self.client_id,
            &self.username,
            &self.password,
        )
    }
}

// Password stays out of logs.
impl fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("start_date", &self.start_date)
            .field("api_base_url", &self.api_base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("lookback_days", &self.lookback_days)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .field("requests_per_second", &self.requests_per_second)
            .finish_non_exhaustive()
    }
}

fn parse_object(text: &str, what: &str) -> Result<JsonObject> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::config(format!("{what} must be a JSON object"))),
        Err(e) => Err(Error::config(format!("Invalid {what}: {e}"))),
    }
}

fn read_file_object(path: &Path) -> Result<JsonObject> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if !is_yaml {
        return parse_object(&content, "config file");
    }

    let value = serde_yaml::from_str::<Value>(&content)
        .with_context(|| format!("Invalid YAML in {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::config("config file must be a mapping")),
    }
}

fn env_object<I>(vars: I) -> JsonObject
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            let field = key.strip_prefix(ENV_PREFIX)?.to_ascii_lowercase();
            let value = if NUMERIC_KEYS.contains(&field.as_str()) {
                value
                    .trim()
                    .parse::<u64>()
                    .map_or(Value::String(value), Value::from)
            } else {
                Value::String(value)
            };
            Some((field, value))
        })
        .collect()
}

/// JSON schema of the configuration, as printed by `spec`
pub fn config_json_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "tap-powerbi-metadata",
        "type": "object",
        "required": ["tenant_id", "client_id", "username", "password"],
        "properties": {
            "tenant_id": {"type": "string", "description": "Azure AD tenant ID"},
            "client_id": {"type": "string", "description": "Application (client) ID"},
            "username": {"type": "string", "description": "Power BI admin account"},
            "password": {"type": "string", "description": "Password of the admin account", "secret": true},
            "start_date": {"type": "string", "format": "date-time", "description": "First day to read when no state exists"},
            "api_base_url": {"type": "string", "default": DEFAULT_API_BASE_URL},
            "auth_base_url": {"type": "string", "default": DEFAULT_AUTH_BASE_URL},
            "lookback_days": {"type": "integer", "minimum": 0, "maximum": MAX_LOOKBACK_DAYS, "default": 30},
            "max_retries": {"type": "integer", "minimum": 0, "default": 3},
            "timeout_secs": {"type": "integer", "minimum": 1, "default": 30},
            "requests_per_second": {"type": "integer", "minimum": 1, "default": 10},
            "user_agent": {"type": "string"}
        }
    })
}
