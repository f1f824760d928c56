//! Query exchange configuration
//!
//! Values are layered: defaults, then a JSON5 config file, then builder
//! overrides, then `PRINTERZ_CONFIG_OVERRIDE`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{Builder, error::ConfigError};

pub const CONFIG_FILE_ENV: &str = "PRINTERZ_CONFIG_FILE";
pub const CONFIG_OVERRIDE_ENV: &str = "PRINTERZ_CONFIG_OVERRIDE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Time allowed for one attempt, from request to closing brace.
    pub timeout_ms: u64,
    /// Extra attempts after the first one times out.
    pub retries: u32,
    pub retry_delay_ms: u64,
    /// Upper bound on a response body in bytes.
    pub max_response_len: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            retries: 2,
            retry_delay_ms: 100,
            max_response_len: printer_z_query::DEFAULT_MAX_BODY_LEN,
        }
    }
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }
        if self.max_response_len == 0 {
            return Err(ConfigError::Invalid(
                "max_response_len must be positive".into(),
            ));
        }
        Ok(())
    }
}

pub struct QueryConfigBuilder {
    config_file: Option<PathBuf>,
    config_overrides: Vec<(String, Value)>,
    use_env: bool,
}

impl Default for QueryConfigBuilder {
    fn default() -> Self {
        Self {
            config_file: None,
            config_overrides: Vec::new(),
            use_env: true,
        }
    }
}

impl QueryConfigBuilder {
    /// Load configuration from a JSON5 file
    pub fn with_config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Add a JSON configuration override
    ///
    /// # Example
    /// ```
    /// use printer_z::{Builder, QueryConfigBuilder};
    /// use serde_json::json;
    ///
    /// let config = QueryConfigBuilder::default()
    ///     .ignore_env()
    ///     .with_json("retries", json!(5))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.retries, 5);
    /// ```
    pub fn with_json<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.config_overrides.push((key.into(), value));
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_json("timeout_ms", json!(saturating_millis(timeout)))
    }

    pub fn with_retries(self, retries: u32) -> Self {
        self.with_json("retries", json!(retries))
    }

    pub fn with_retry_delay(self, delay: Duration) -> Self {
        self.with_json("retry_delay_ms", json!(saturating_millis(delay)))
    }

    pub fn with_max_response_len(self, len: usize) -> Self {
        self.with_json("max_response_len", json!(len))
    }

    /// Skip `PRINTERZ_CONFIG_FILE` and `PRINTERZ_CONFIG_OVERRIDE`.
    pub fn ignore_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    fn config_file(&self, env_file: Option<PathBuf>) -> Option<PathBuf> {
        self.config_file.clone().or(env_file)
    }

    fn apply_env_overrides(mut self, env_overrides: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(overrides_str) = env_overrides {
            tracing::debug!(
                "Applying config overrides from {}: {}",
                CONFIG_OVERRIDE_ENV,
                overrides_str
            );
            self.config_overrides
                .extend(parse_overrides(overrides_str)?);
        }
        Ok(self)
    }

    /// Layer the sources, with the environment values already read.
    fn build_with_env(
        mut self,
        env_file: Option<PathBuf>,
        env_overrides: Option<&str>,
    ) -> Result<QueryConfig, ConfigError> {
        // Priority order:
        // 1. Defaults
        // 2. Config file passed via with_config_file(), else PRINTERZ_CONFIG_FILE
        // 3. Builder overrides
        // 4. PRINTERZ_CONFIG_OVERRIDE
        let mut values = match serde_json::to_value(QueryConfig::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if let Some(path) = self.config_file(env_file) {
            tracing::debug!("Loading query config from {}", path.display());
            values.extend(load_file(&path)?);
        }

        self = self.apply_env_overrides(env_overrides)?;
        for (key, value) in self.config_overrides {
            values.insert(key, value);
        }

        let config: QueryConfig = serde_json::from_value(Value::Object(values))
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        tracing::debug!("Query config: {:?}", config);
        Ok(config)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Parse `key1=value1;key2=value2` where each value is JSON5.
pub fn parse_overrides(overrides_str: &str) -> Result<Vec<(String, Value)>, ConfigError> {
    let mut overrides = Vec::new();
    for pair in overrides_str.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        // Split on first '=' only
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ConfigError::OverrideFormat(pair.to_string()));
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(ConfigError::OverrideFormat(pair.to_string()));
        }

        let json_value = json5::from_str::<Value>(value).map_err(|e| ConfigError::OverrideValue {
            key: key.to_string(),
            reason: format!("{} (value: {})", e, value),
        })?;
        tracing::debug!("Override: {} = {}", key, json_value);
        overrides.push((key.to_string(), json_value));
    }
    Ok(overrides)
}

fn load_file(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match json5::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ConfigError::File {
            path: path.to_path_buf(),
            reason: format!("expected an object, found {}", other),
        }),
        Err(e) => Err(ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

impl Builder for QueryConfigBuilder {
    type Output = QueryConfig;

    fn build(self) -> Result<QueryConfig, ConfigError> {
        if !self.use_env {
            return self.build_with_env(None, None);
        }
        let env_file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        let env_overrides = std::env::var(CONFIG_OVERRIDE_ENV).ok();
        self.build_with_env(env_file, env_overrides.as_deref())
    }
}
