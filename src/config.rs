use crate::constants;
use crate::error::{MigrateError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bluesky: BlueskyConfig,
    pub http: HttpConfig,
    pub bridge: BridgeConfig,
    pub verify: VerifyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlueskyConfig {
    pub api_base: String,
    pub page_size: u32,
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            api_base: constants::BSKY_API_BASE.to_string(),
            page_size: constants::FOLLOWS_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            user_agent: constants::USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub domain: String,
    pub pause_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            domain: constants::BRIDGE_DOMAIN.to_string(),
            pause_ms: constants::DEFAULT_BRIDGE_PAUSE_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub workers: usize,
    /// URL scheme used for WebFinger lookups
    pub scheme: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            workers: constants::DEFAULT_WORKERS,
            scheme: constants::DISCOVERY_SCHEME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load from `path`, else `bsky2masto.toml` in the working directory if present,
    /// else defaults. Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MigrateError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("BSKY2MASTO_API_BASE") {
            self.bluesky.api_base = base;
        }
        if let Some(timeout) = lookup("BSKY2MASTO_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_number("BSKY2MASTO_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(domain) = lookup("BSKY2MASTO_BRIDGE_DOMAIN") {
            self.bridge.domain = domain;
        }
        if let Some(workers) = lookup("BSKY2MASTO_WORKERS") {
            self.verify.workers = parse_number("BSKY2MASTO_WORKERS", &workers)?;
        }
        if let Some(dir) = lookup("BSKY2MASTO_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(MigrateError::Config(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.bluesky.page_size == 0 {
            return Err(MigrateError::Config(
                "bluesky.page_size must be greater than zero".to_string(),
            ));
        }
        self.verify.workers = self.verify.workers.max(1);
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MigrateError::Config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bluesky.api_base, "https://public.api.bsky.app/xrpc");
        assert_eq!(config.bluesky.page_size, 100);
        assert_eq!(config.http.timeout_secs, 12);
        assert!(config.http.user_agent.starts_with("bsky2masto/"));
        assert_eq!(config.bridge.domain, "bsky.brid.gy");
        assert_eq!(config.bridge.pause_ms, 150);
        assert_eq!(config.verify.workers, 8);
        assert_eq!(config.verify.scheme, "https");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [http]
            timeout_secs = 5

            [verify]
            workers = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.verify.workers, 2);
        assert_eq!(config.bridge.domain, "bsky.brid.gy");
        assert!(config.http.user_agent.starts_with("bsky2masto/"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml_str("[http]\ntimeout_secs = \"soon\""),
            Err(MigrateError::Toml(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BSKY2MASTO_API_BASE", "http://127.0.0.1:9000/xrpc"),
            ("BSKY2MASTO_WORKERS", "3"),
            ("BSKY2MASTO_LOG_DIR", "/tmp/bsky2masto-logs"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bluesky.api_base, "http://127.0.0.1:9000/xrpc");
        assert_eq!(config.verify.workers, 3);
        assert_eq!(
            config.logging.dir.as_deref(),
            Some(Path::new("/tmp/bsky2masto-logs"))
        );
    }

    #[test]
    fn test_env_override_rejects_garbage_numbers() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|key| (key == "BSKY2MASTO_TIMEOUT_SECS").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn test_validate_clamps_workers_and_rejects_zero_timeout() {
        let mut config = Config::default();
        config.verify.workers = 0;
        config.validate().unwrap();
        assert_eq!(config.verify.workers, 1);

        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
