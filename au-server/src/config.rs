//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or the
//! `AU_SERVER_CONFIG` environment variable. A missing file is not an error: every field has a
//! default, so the server starts on `0.0.0.0:8000` with the frontend dev origin allowed.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **Defaults** - [`Config::default`], applied per field through `#[serde(default)]`
//! 2. **YAML config file** - (default: `config.yaml`)
//! 3. **Environment variables** - Variables prefixed with `AU_SERVER_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `AU_SERVER_LIMITS__MAX_UPLOAD_SIZE=10485760` sets the `limits.max_upload_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use au_server::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}", config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! AU_SERVER_PORT=8080
//!
//! # Allow a second frontend origin
//! AU_SERVER_CORS__ALLOWED_ORIGINS='["http://localhost:3000","https://app.example.com"]'
//!
//! # Turn off the interactive API docs
//! AU_SERVER_ENABLE_DOCS=false
//! ```

use axum::http::HeaderName;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::Error;

/// Origin of the frontend dev server, allowed by default.
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "AU_SERVER_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Immutable once loaded; [`crate::build_router`] reads it once and handlers never see it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
    /// Request size limits
    pub limits: LimitsConfig,
    /// Serve the OpenAPI document at `/openapi.json` and the API reference UI at `/docs`
    pub enable_docs: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
    /// Custom headers to expose to the browser (in addition to CORS-safelisted headers)
    pub exposed_headers: Vec<String>,
}

/// Request size limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum size in bytes of an `/upload` request body. `None` means unlimited.
    pub max_upload_size: Option<usize>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard", serialize_with = "serialize_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

impl CorsConfig {
    /// Whether any configured origin is `*`.
    pub fn has_wildcard(&self) -> bool {
        self.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard))
    }
}

impl CorsOrigin {
    /// The value as it appears in an `Origin` header: scheme, host and port, no trailing slash.
    pub fn header_value(&self) -> String {
        match self {
            CorsOrigin::Wildcard => "*".to_string(),
            CorsOrigin::Url(url) => url.origin().ascii_serialization(),
        }
    }
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn serialize_wildcard<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("*")
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors: CorsConfig::default(),
            limits: LimitsConfig::default(),
            enable_docs: true,
            enable_otel_export: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Url(
                Url::parse(DEFAULT_FRONTEND_ORIGIN).expect("static origin is a valid URL"),
            )],
            allow_credentials: true,
            max_age: Some(600),
            exposed_headers: vec![],
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. \
                            Add at least one allowed origin."
                    .to_string(),
            });
        }

        if self.cors.has_wildcard() && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. \
                            Specify explicit origins."
                    .to_string(),
            });
        }

        for header in &self.cors.exposed_headers {
            if header.parse::<HeaderName>().is_err() {
                return Err(Error::Internal {
                    operation: format!(
                        "Config validation: '{header}' in cors.exposed_headers is not a valid header name"
                    ),
                });
            }
        }

        if self.limits.max_upload_size == Some(0) {
            return Err(Error::Internal {
                operation: "Config validation: limits.max_upload_size cannot be 0. \
                            Omit it to allow uploads of any size."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // AU_SERVER_CONFIG names the file itself, it is not a config key
            .merge(Env::prefixed("AU_SERVER_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
