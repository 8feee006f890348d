use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_FORMSPREE_ENDPOINT: &str = "https://formspree.io/f/xyzpqkqp";
const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
const DEFAULT_EMAIL_FROM: &str = "noreply@ritusmin-portfolio.netlify.app";
const DEFAULT_EMAIL_TO: &str = "ritusminwebsite@gmail.com";
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const REQUEST_TIMEOUT_MS_BOUNDS: (u64, u64) = (100, 120_000);
const CONNECT_TIMEOUT_MS_BOUNDS: (u64, u64) = (100, 30_000);

pub const RESEND_API_KEY_ENV: &str = "RESEND_API_KEY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingSecret(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub port: u16,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub formspree_endpoint: Url,
    pub resend_api_url: Url,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub email_to: String,
    pub static_dir: PathBuf,
    pub log_level: LogLevel,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            formspree_endpoint: default_url(DEFAULT_FORMSPREE_ENDPOINT),
            resend_api_url: default_url(DEFAULT_RESEND_API_URL),
            resend_api_key: None,
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            email_to: DEFAULT_EMAIL_TO.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`RelayConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let request_timeout_ms = parse_u64_with_bounds(
            &lookup,
            "RELAY_REQUEST_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
            REQUEST_TIMEOUT_MS_BOUNDS,
        );
        let connect_timeout_ms = parse_u64_with_bounds(
            &lookup,
            "RELAY_CONNECT_TIMEOUT_MS",
            DEFAULT_CONNECT_TIMEOUT_MS,
            CONNECT_TIMEOUT_MS_BOUNDS,
        );

        Self {
            port,
            request_timeout: Duration::from_millis(request_timeout_ms),
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            formspree_endpoint: parse_http_url(&lookup, "FORMSPREE_ENDPOINT")
                .unwrap_or(defaults.formspree_endpoint),
            resend_api_url: parse_http_url(&lookup, "RESEND_API_URL")
                .map(as_base_url)
                .unwrap_or(defaults.resend_api_url),
            resend_api_key: parse_non_empty_string(&lookup, RESEND_API_KEY_ENV),
            email_from: parse_non_empty_string(&lookup, "EMAIL_FROM").unwrap_or(defaults.email_from),
            email_to: parse_non_empty_string(&lookup, "EMAIL_TO").unwrap_or(defaults.email_to),
            static_dir: parse_non_empty_string(&lookup, "STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            log_level: parse_log_level(&lookup, "LOG_LEVEL", DEFAULT_LOG_LEVEL),
        }
    }

    pub fn require_resend_api_key(&self) -> Result<&str, ConfigError> {
        self.resend_api_key
            .as_deref()
            .ok_or(ConfigError::MissingSecret(RESEND_API_KEY_ENV))
    }
}

fn default_url(value: &str) -> Url {
    Url::parse(value).expect("built-in default URL is valid")
}

fn parse_u64_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
    bounds: (u64, u64),
) -> u64 {
    lookup(name)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_non_empty_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_http_url(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Url> {
    let value = parse_non_empty_string(lookup, name)?;
    let parsed = Url::parse(&value).ok()?;

    if parsed.scheme() == "http" || parsed.scheme() == "https" {
        Some(parsed)
    } else {
        None
    }
}

/// Relative joins replace the last path segment unless it ends with `/`.
fn as_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_log_level(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: LogLevel) -> LogLevel {
    match parse_non_empty_string(lookup, name)
        .unwrap_or_else(|| default.as_str().to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> RelayConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        RelayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.formspree_endpoint.as_str(), DEFAULT_FORMSPREE_ENDPOINT);
        assert_eq!(config.resend_api_key, None);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(
            config.require_resend_api_key(),
            Err(ConfigError::MissingSecret("RESEND_API_KEY"))
        );
    }

    #[test]
    fn out_of_bounds_timeouts_fall_back_to_defaults() {
        let config = config_from(&[
            ("RELAY_REQUEST_TIMEOUT_MS", "5"),
            ("RELAY_CONNECT_TIMEOUT_MS", "2500"),
        ]);

        assert_eq!(config.request_timeout, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS));
        assert_eq!(config.connect_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let config = config_from(&[("RESEND_API_KEY", "   ")]);
        assert!(config.require_resend_api_key().is_err());

        let config = config_from(&[("RESEND_API_KEY", " re_123 ")]);
        assert_eq!(config.require_resend_api_key(), Ok("re_123"));
    }

    #[test]
    fn non_http_endpoints_are_ignored() {
        let config = config_from(&[
            ("FORMSPREE_ENDPOINT", "ftp://formspree.io/f/x"),
            ("RESEND_API_URL", "http://127.0.0.1:9000"),
            ("LOG_LEVEL", "DEBUG"),
        ]);

        assert_eq!(config.formspree_endpoint.as_str(), DEFAULT_FORMSPREE_ENDPOINT);
        assert_eq!(config.resend_api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn resend_base_path_is_kept_when_joining() {
        let config = config_from(&[("RESEND_API_URL", "https://relay.example/v1")]);

        assert_eq!(config.resend_api_url.as_str(), "https://relay.example/v1/");
        assert_eq!(
            config.resend_api_url.join("emails").map(String::from),
            Ok("https://relay.example/v1/emails".to_string())
        );
    }
}
