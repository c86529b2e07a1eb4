use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Service settings, read from `CERTS_*` environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file holding the certificates
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted spreadsheet upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Upper bound for parsing and importing one upload
    #[serde(default = "default_import_timeout_secs")]
    pub import_timeout_secs: u64,

    /// Directory holding the TTF files used for certificate PDFs
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: String,

    /// Font family name, e.g. `LiberationSans` for `LiberationSans-Regular.ttf`
    #[serde(default = "default_font_family")]
    pub font_family: String,

    // Identity provider
    /// Shared secret for HS256-signed bearer tokens
    #[serde(default)]
    pub auth_hs256_secret: Option<String>,

    /// PEM public key for RS256-signed bearer tokens; takes precedence over the secret
    #[serde(default)]
    pub auth_rsa_public_key_pem: Option<String>,

    /// Expected `iss` claim
    #[serde(default)]
    pub auth_issuer: Option<String>,

    /// Expected `aud` claim
    #[serde(default)]
    pub auth_audience: Option<String>,

    /// Comma-separated browser origins allowed to call the API; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database_path() -> String {
    "certificates.sqlite".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_import_timeout_secs() -> u64 {
    120
}

fn default_fonts_dir() -> String {
    "./fonts".to_string()
}

fn default_font_family() -> String {
    "LiberationSans".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            log_level: default_log_level(),
            max_upload_bytes: default_max_upload_bytes(),
            import_timeout_secs: default_import_timeout_secs(),
            fonts_dir: default_fonts_dir(),
            font_family: default_font_family(),
            auth_hs256_secret: None,
            auth_rsa_public_key_pem: None,
            auth_issuer: None,
            auth_audience: None,
            cors_origin: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("CERTS"))
            .build()?
            .try_deserialize()
    }

    /// The configured CORS origins. Empty means any origin is allowed.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origin
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}
