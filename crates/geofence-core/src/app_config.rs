use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub places_api_key: Option<String>,
    pub directions_api_key: Option<String>,
    pub maps_api_key: Option<String>,
    pub basic_auth_password: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub export_dir: PathBuf,
    pub fixtures_dir: PathBuf,
    pub category_synonyms_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub enrich_delay_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("places_api_key", &redact(&self.places_api_key))
            .field("directions_api_key", &redact(&self.directions_api_key))
            .field("maps_api_key", &redact(&self.maps_api_key))
            .field("basic_auth_password", &redact(&self.basic_auth_password))
            .field("slack_webhook_url", &redact(&self.slack_webhook_url))
            .field("export_dir", &self.export_dir)
            .field("fixtures_dir", &self.fixtures_dir)
            .field("category_synonyms_path", &self.category_synonyms_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("enrich_delay_ms", &self.enrich_delay_ms)
            .finish()
    }
}
