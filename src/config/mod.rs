use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapingError};

pub const CONFIG_PATH_ENV: &str = "MARS_SCRAPER_CONFIG";
pub const CHROME_ENV: &str = "MARS_SCRAPER_CHROME";
pub const STORE_ENV: &str = "MARS_SCRAPER_STORE";
pub const BIND_ENV: &str = "MARS_SCRAPER_BIND";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub sources: SourceConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

/// The fixed pages the pipeline reads, and the origins used to absolutize
/// the relative links found on them.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SourceConfig {
    pub news_url: String,
    pub featured_image_url: String,
    pub weather_url: String,
    pub facts_url: String,
    pub hemispheres_url: String,
    pub jpl_origin: String,
    pub usgs_origin: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HttpConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BrowserConfig {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    #[serde(with = "humantime_serde")]
    pub launch_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourceConfig {
                news_url: "https://mars.nasa.gov/news/".to_string(),
                featured_image_url: "https://www.jpl.nasa.gov/spaceimages/?search=&category=Mars"
                    .to_string(),
                weather_url: "https://twitter.com/marswxreport?lang=en".to_string(),
                facts_url: "http://space-facts.com/mars/".to_string(),
                hemispheres_url:
                    "https://astrogeology.usgs.gov/search/results?q=hemisphere+enhanced&k1=target&v1=Mars"
                        .to_string(),
                jpl_origin: "https://www.jpl.nasa.gov".to_string(),
                usgs_origin: "https://astrogeology.usgs.gov".to_string(),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(30),
                user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
            },
            browser: BrowserConfig {
                executable: None,
                headless: true,
                launch_timeout: Duration::from_secs(20),
                settle_delay: Duration::from_secs(2),
            },
            storage: StorageConfig {
                path: PathBuf::from("./data/mars.json"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
            },
        }
    }
}

impl Config {
    /// Overlay deployment-specific values from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(chrome) = lookup(CHROME_ENV).filter(|v| !v.trim().is_empty()) {
            debug!("Browser executable overridden from {}", CHROME_ENV);
            self.browser.executable = Some(PathBuf::from(chrome));
        }
        if let Some(store) = lookup(STORE_ENV).filter(|v| !v.trim().is_empty()) {
            debug!("Storage path overridden from {}", STORE_ENV);
            self.storage.path = PathBuf::from(store);
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            debug!("Bind address overridden from {}", BIND_ENV);
            self.server.bind = bind;
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            ScrapingError::ConfigError(format!("Invalid bind address '{}': {}", self.server.bind, e))
        })
    }
}

#[async_trait::async_trait]
pub trait ConfigManager {
    async fn load_config(&self) -> Result<Config>;
    async fn save_config(&self, config: &Config) -> Result<()>;
    fn validate_config(&self, config: &Config) -> Result<()>;
}

pub struct FileConfigManager {
    config_path: PathBuf,
}

impl FileConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Config path from `MARS_SCRAPER_CONFIG`, falling back to `config.toml`.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
        Self::new(PathBuf::from(path))
    }
}

#[async_trait::async_trait]
impl ConfigManager for FileConfigManager {
    async fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config_path);

        if !self.config_path.exists() {
            warn!("Configuration file not found, creating default config at {:?}", self.config_path);
            self.create_default_config().await?;
        }

        let config_content = fs::read_to_string(&self.config_path)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&config_content)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to parse TOML config: {}", e)))?;

        config.apply_env_overrides();
        self.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    fn validate_config(&self, config: &Config) -> Result<()> {
        debug!("Validating configuration");

        let sources = &config.sources;
        let urls = [
            ("news_url", &sources.news_url),
            ("featured_image_url", &sources.featured_image_url),
            ("weather_url", &sources.weather_url),
            ("facts_url", &sources.facts_url),
            ("hemispheres_url", &sources.hemispheres_url),
            ("jpl_origin", &sources.jpl_origin),
            ("usgs_origin", &sources.usgs_origin),
        ];
        for (name, value) in urls {
            let parsed = url::Url::parse(value)
                .map_err(|e| ScrapingError::ConfigError(format!("{} '{}' is not a URL: {}", name, value, e)))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ScrapingError::ConfigError(format!("{} must use http or https", name)));
            }
        }

        if config.http.timeout.is_zero() {
            return Err(ScrapingError::ConfigError("http.timeout must be greater than 0".to_string()));
        }
        if config.http.user_agent.trim().is_empty() {
            return Err(ScrapingError::ConfigError("http.user_agent cannot be empty".to_string()));
        }

        if config.browser.launch_timeout.is_zero() {
            return Err(ScrapingError::ConfigError("browser.launch_timeout must be greater than 0".to_string()));
        }
        if let Some(ref executable) = config.browser.executable {
            if !executable.exists() {
                return Err(ScrapingError::ConfigError(format!("Browser executable not found: {:?}", executable)));
            }
        }

        if config.storage.path.as_os_str().is_empty() {
            return Err(ScrapingError::ConfigError("storage.path cannot be empty".to_string()));
        }

        config.bind_addr()?;

        debug!("Configuration validation passed");
        Ok(())
    }

    async fn save_config(&self, config: &Config) -> Result<()> {
        info!("Saving configuration to {:?}", self.config_path);

        let toml_content = toml::to_string_pretty(config)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_path, toml_content)
            .map_err(|e| ScrapingError::ConfigError(format!("Failed to write config file: {}", e)))?;

        info!("Configuration saved successfully");
        Ok(())
    }
}

impl FileConfigManager {
    /// Create a default configuration file
    async fn create_default_config(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScrapingError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        self.save_config(&Config::default()).await?;
        info!("Default configuration file created at {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = FileConfigManager::new(config_path.clone());

        let config = manager.load_config().await.unwrap();

        assert_eq!(config.sources.jpl_origin, "https://www.jpl.nasa.gov");
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert!(config.browser.headless);
        assert!(config_path.exists());
    }

    #[tokio::test]
    async fn test_durations_round_trip_as_humantime() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = FileConfigManager::new(config_path.clone());

        manager.save_config(&Config::default()).await.unwrap();
        let written = fs::read_to_string(&config_path).unwrap();
        assert!(written.contains("timeout = \"30s\""));

        let reloaded: Config = toml::from_str(&written).unwrap();
        assert_eq!(reloaded.browser.settle_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_config_validation() {
        let manager = FileConfigManager::new(PathBuf::from("test.toml"));

        assert!(manager.validate_config(&Config::default()).is_ok());

        let mut invalid = Config::default();
        invalid.sources.news_url = "ftp://mars.nasa.gov/news/".to_string();
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = Config::default();
        invalid.sources.usgs_origin = "not a url".to_string();
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = Config::default();
        invalid.http.timeout = Duration::ZERO;
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = Config::default();
        invalid.browser.executable = Some(PathBuf::from("/definitely/missing/chromedriver"));
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = Config::default();
        invalid.server.bind = "localhost".to_string();
        assert!(manager.validate_config(&invalid).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (CHROME_ENV, "/opt/chrome/chrome"),
            (STORE_ENV, "/var/lib/mars/record.json"),
            (BIND_ENV, ""),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.browser.executable, Some(PathBuf::from("/opt/chrome/chrome")));
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/mars/record.json"));
        // blank values leave the file setting alone
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }
}
