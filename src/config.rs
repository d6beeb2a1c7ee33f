use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Tumblr API
    pub api_key: String,
    pub api_base: String,
    pub poll_api_base: String,
    pub http_timeout: Duration,

    // What to archive
    pub blog_identifier: String,
    pub tags_to_archive: Vec<String>,
    pub latest_posts_limit: u32,

    // Output
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Tumblr API
            api_key: required_env("TUMBLR_API_KEY")?,
            api_base: env_or_default("TUMBLR_API_BASE", "https://api.tumblr.com/v2"),
            poll_api_base: env_or_default("TUMBLR_POLL_API_BASE", "https://www.tumblr.com/api/v2"),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // What to archive
            blog_identifier: required_env("BLOG_IDENTIFIER")?,
            tags_to_archive: optional_env("TAGS_TO_ARCHIVE")
                .map(|tags| parse_tag_list(&tags))
                .unwrap_or_default(),
            latest_posts_limit: parse_env_u32("LATEST_POSTS_LIMIT", 25)?,

            // Output
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", "blogs")),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "TUMBLR_API_KEY".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.blog_identifier.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "BLOG_IDENTIFIER".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.latest_posts_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "LATEST_POSTS_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// A complete configuration for tests. Point the API bases at a mock
    /// server and `output_dir` at a temp dir before use.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: "test-api-key".to_string(),
            api_base: "http://127.0.0.1:9/v2".to_string(),
            poll_api_base: "http://127.0.0.1:9/api/v2".to_string(),
            http_timeout: Duration::from_secs(5),
            blog_identifier: "test-blog".to_string(),
            tags_to_archive: Vec::new(),
            latest_posts_limit: 25,
            output_dir: PathBuf::from("blogs"),
        }
    }
}

/// Split a comma-separated tag list, dropping blank entries.
fn parse_tag_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const VARS: [&str; 8] = [
        "TUMBLR_API_KEY",
        "BLOG_IDENTIFIER",
        "TAGS_TO_ARCHIVE",
        "OUTPUT_DIR",
        "TUMBLR_API_BASE",
        "TUMBLR_POLL_API_BASE",
        "LATEST_POSTS_LIMIT",
        "HTTP_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(
            parse_tag_list(" art, ,wip ,,my art"),
            vec!["art", "wip", "my art"]
        );
        assert!(parse_tag_list(" , ").is_empty());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("TUMBLR_API_KEY", "key");
        std::env::set_var("BLOG_IDENTIFIER", "staff");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.blog_identifier, "staff");
        assert!(config.tags_to_archive.is_empty());
        assert_eq!(config.output_dir, PathBuf::from("blogs"));
        assert_eq!(config.api_base, "https://api.tumblr.com/v2");
        assert_eq!(config.poll_api_base, "https://www.tumblr.com/api/v2");
        assert_eq!(config.latest_posts_limit, 25);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_required_vars() {
        clear_env();
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingEnvVar(name)) if name == "TUMBLR_API_KEY"
        ));

        std::env::set_var("TUMBLR_API_KEY", "key");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingEnvVar(name)) if name == "BLOG_IDENTIFIER"
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_integer() {
        clear_env();
        std::env::set_var("TUMBLR_API_KEY", "key");
        std::env::set_var("BLOG_IDENTIFIER", "staff");
        std::env::set_var("LATEST_POSTS_LIMIT", "many");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::ParseInt { name, .. }) if name == "LATEST_POSTS_LIMIT"
        ));

        clear_env();
    }

    #[test]
    fn test_validate() {
        assert!(Config::for_testing().validate().is_ok());

        let config = Config {
            api_key: "  ".to_string(),
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());

        let config = Config {
            latest_posts_limit: 0,
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());

        let config = Config {
            http_timeout: Duration::ZERO,
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }
}
