use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::render::Layout;

// --- CONFIG AGGREGATOR ---

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub aggregator: AggregatorConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Read `.env` (if any) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Ok(Self {
            server: ServerConfig::load()?,
            aggregator: AggregatorConfig::load()?,
            render: RenderConfig::load()?,
        })
    }
}

// --- MODULES ---

// SERVER
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub log_level: String,
}

impl ServerConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            log_level: get_env("RDBVIZ_LOG", "info")?,
        })
    }
}

// AGGREGATOR
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Bounded capacity of every event stream
    pub channel_capacity: usize,
    pub progress_interval_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            progress_interval_secs: 10,
        }
    }
}

impl AggregatorConfig {
    fn load() -> Result<Self, ConfigError> {
        let config = Self {
            channel_capacity:       get_env("RDBVIZ_CHANNEL_CAP", "1024")?,
            progress_interval_secs: get_env("RDBVIZ_PROGRESS_SECS", "10")?,
        };
        if config.channel_capacity == 0 {
            return Err(invalid("RDBVIZ_CHANNEL_CAP", "0"));
        }
        if config.progress_interval_secs == 0 {
            return Err(invalid("RDBVIZ_PROGRESS_SECS", "0"));
        }
        Ok(config)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs.max(1))
    }
}

// RENDER
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl RenderConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            width:   get_env("RDBVIZ_WIDTH", "1200")?,
            height:  get_env("RDBVIZ_HEIGHT", "900")?,
            columns: get_env("RDBVIZ_COLUMNS", "3")?,
            rows:    get_env("RDBVIZ_ROWS", "2")?,
        })
    }

    pub fn layout(&self) -> Layout {
        Layout {
            width: self.width as i64,
            height: self.height as i64,
            columns: self.columns as i64,
            rows: self.rows as i64,
            ..Layout::default()
        }
    }
}

// --- PRIVATE HELPER ---

fn get_env<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| invalid(key, &raw))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_falls_back_to_default() {
        let value: u32 = get_env("RDBVIZ_TEST_SURELY_UNSET_KEY", "42").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_get_env_rejects_garbage() {
        let result: Result<u32, _> = get_env("RDBVIZ_TEST_SURELY_UNSET_KEY_2", "wide");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_render_config_maps_to_layout() {
        let config = RenderConfig { width: 800, height: 600, columns: 2, rows: 1 };
        let layout = config.layout();
        assert_eq!(layout.width, 800);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.margin, Layout::default().margin);
    }
}
