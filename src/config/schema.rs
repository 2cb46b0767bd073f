/// Configuration schema for the licensing client
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Licensing server root, e.g. "https://auth.example.com/"
    pub base_url: String,

    pub app_name: String,

    pub app_key: String,

    /// Application secret, also the HMAC key for secure requests
    pub app_secret: String,

    /// Application version reported on init and license checks
    #[serde(default = "default_version")]
    pub version: String,

    /// Sign login requests and use the secure login endpoint
    #[serde(default = "default_true")]
    pub secure_mode: bool,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Hash the hostname/username fallback HWID instead of sending it raw
    #[serde(default)]
    pub hash_fallback: bool,

    /// Where saved credentials live for auto-login
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    /// Log level: "error", "warn", "info", "debug", "trace", "off"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_credentials_path() -> String {
    "credentials.dat".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl ClientConfig {
    /// Config with defaults for everything but the app identity
    pub fn new(
        base_url: impl Into<String>,
        app_name: impl Into<String>,
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_name: app_name.into(),
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            version: default_version(),
            secure_mode: true,
            timeout_secs: default_timeout_secs(),
            hash_fallback: false,
            credentials_path: default_credentials_path(),
            log_level: default_log_level(),
        }
    }

    /// Get the effective base URL, prioritizing compile-time default
    pub fn effective_base_url(&self) -> String {
        // If CLOUDAUTH_BASE_URL was set at compile time, use it (hardcoded into binary)
        if let Some(compile_time_url) = option_env!("CLOUDAUTH_BASE_URL") {
            if !compile_time_url.is_empty() {
                return compile_time_url.to_string();
            }
        }

        self.base_url.clone()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("app_name", &self.app_name),
            ("app_key", &self.app_key),
            ("app_secret", &self.app_secret),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", field)));
            }
        }

        let effective_url = self.effective_base_url();

        if effective_url.is_empty() {
            return Err(Error::Config("base_url cannot be empty".to_string()));
        }

        if !effective_url.starts_with("http://") && !effective_url.starts_with("https://") {
            return Err(Error::Config(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::new("https://auth.example.com", "Demo", "key", "secret");
        assert!(config.validate().is_ok());

        config.app_key = "".to_string();
        assert!(config.validate().is_err());

        config.app_key = "key".to_string();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_url() {
        if option_env!("CLOUDAUTH_BASE_URL").is_some_and(|url| !url.is_empty()) {
            return;
        }

        let config = ClientConfig::new("ftp://auth.example.com", "Demo", "key", "secret");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_default_values() {
        let json = r#"{
            "base_url": "https://auth.example.com",
            "app_name": "Demo",
            "app_key": "key",
            "app_secret": "secret"
        }"#;

        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.version, "1.0.0");
        assert!(config.secure_mode);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(!config.hash_fallback);
        assert_eq!(config.credentials_path, "credentials.dat");
        assert_eq!(config.log_level, "warn");
    }
}
