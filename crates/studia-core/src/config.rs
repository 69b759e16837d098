use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL of the upstream course API
    pub courses_api_url: String,

    /// Cache backend settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Request timeout for the upstream API, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Connection settings for the shared TTL cache backend.
///
/// The backend is externally managed infrastructure; these values are
/// opaque inputs passed through to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub tls: bool,

    /// Entry expiration in seconds (default 30 minutes)
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    1800
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            tls: false,
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// Build the connection URL for the cache client.
    pub fn connection_url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        match &self.password {
            Some(password) => format!("{}://:{}@{}:{}/", scheme, password, self.host, self.port),
            None => format!("{}://{}:{}/", scheme, self.host, self.port),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing variables fall back to defaults; call `validate()` to
    /// surface anything unusable before wiring services.
    pub fn from_env() -> Self {
        let cache = CacheConfig {
            host: env_or("STUDIA_REDIS_HOST", "127.0.0.1"),
            port: env_parsed("STUDIA_REDIS_PORT", 6379),
            password: std::env::var("STUDIA_REDIS_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
            tls: env_parsed("STUDIA_REDIS_TLS", false),
            ttl_secs: env_parsed("STUDIA_CACHE_TTL_SECS", default_cache_ttl_secs()),
        };

        Self {
            courses_api_url: env_or("STUDIA_COURSES_API_URL", ""),
            cache,
            http_timeout_secs: env_parsed("STUDIA_HTTP_TIMEOUT_SECS", default_http_timeout_secs()),
        }
    }

    /// Validate the configuration, returning field-level errors and warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.courses_api_url.is_empty() {
            result.add_error("courses_api_url", "upstream course API URL is not set");
        } else if Url::parse(&self.courses_api_url).is_err() {
            result.add_error("courses_api_url", "not a valid URL");
        }

        if self.cache.host.is_empty() {
            result.add_error("cache.host", "cache host is not set");
        }
        if self.cache.port == 0 {
            result.add_error("cache.port", "cache port must be non-zero");
        }
        if self.cache.ttl_secs == 0 {
            result.add_error("cache.ttl_secs", "cache TTL must be non-zero");
        }
        if self.cache.password.is_none() && self.cache.tls {
            result.add_warning("cache.password", "TLS enabled but no password configured");
        }
        if self.http_timeout_secs == 0 {
            result.add_error("http_timeout_secs", "HTTP timeout must be non-zero");
        }

        result
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn test_config() -> Config {
        Config {
            courses_api_url: "https://courses.example.edu/api/student-data".to_string(),
            cache: CacheConfig::default(),
            http_timeout_secs: 10,
        }
    }

    #[test]
    fn test_valid_config() {
        let result = test_config().validate();
        assert!(result.is_valid(), "{}", result.error_summary());
    }

    #[test]
    fn test_missing_api_url() {
        let mut config = test_config();
        config.courses_api_url = String::new();

        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.error_summary().contains("courses_api_url"));
    }

    #[test]
    fn test_invalid_api_url() {
        let mut config = test_config();
        config.courses_api_url = "not a url".to_string();

        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = test_config();
        config.cache.ttl_secs = 0;

        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_connection_url_plain() {
        let cache = CacheConfig::default();
        assert_eq!(cache.connection_url(), "redis://127.0.0.1:6379/");
    }

    #[test]
    fn test_connection_url_tls_with_password() {
        let cache = CacheConfig {
            host: "cache.example.edu".to_string(),
            port: 6380,
            password: Some("secret".to_string()),
            tls: true,
            ttl_secs: 1800,
        };
        assert_eq!(
            cache.connection_url(),
            "rediss://:secret@cache.example.edu:6380/"
        );
    }
}
