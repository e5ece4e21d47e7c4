use color_eyre::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked for the upstream credential, in order.
const CREDENTIAL_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub base_url: String,
    /// Fallback credential when no environment variable is set.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Generation defaults and video polling policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub max_transport_errors: u32,
    pub image_model: String,
    pub video_model: String,
}

/// Where saved results land
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Empty means the platform data directory.
    pub directory: String,
}

/// Log filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            // Two hours at the default interval
            max_poll_attempts: 1440,
            max_transport_errors: 3,
            image_model: "gemini-2.5-flash-image".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "shotcraft=info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                api_key: String::new(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            generation: GenerationConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Config {
    /// Loads configuration from disk or creates default if not found
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Returns the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for log files and saved results
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Directory generated images and videos are written to
    pub fn output_dir(&self) -> Result<PathBuf> {
        let configured = self.output.directory.trim();
        if configured.is_empty() {
            Ok(Self::data_dir()?.join("results"))
        } else {
            Ok(PathBuf::from(configured))
        }
    }

    /// The upstream credential: environment first, then the config file.
    #[must_use]
    pub fn api_key(&self) -> String {
        resolve_api_key(
            CREDENTIAL_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok()),
            &self.gemini.api_key,
        )
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.request_timeout_secs.max(1))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "shotcraft")
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))
    }
}

fn resolve_api_key(env_values: impl IntoIterator<Item = String>, file_value: &str) -> String {
    env_values
        .into_iter()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| file_value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.gemini.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.generation.poll_interval_secs, 5);
        assert_eq!(parsed.generation.video_model, "veo-3.1-fast-generate-preview");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [gemini]
            base_url = "http://localhost:9000"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.gemini.request_timeout_secs, 120);
        assert_eq!(parsed.generation.max_transport_errors, 3);
        assert_eq!(parsed.logging.filter, "shotcraft=info");
        assert!(parsed.output.directory.is_empty());
    }

    #[test]
    fn test_environment_key_wins_over_file() {
        let key = resolve_api_key(vec!["env-key".to_string()], "file-key");
        assert_eq!(key, "env-key");
    }

    #[test]
    fn test_blank_environment_key_is_skipped() {
        let key = resolve_api_key(vec!["  ".to_string()], " file-key ");
        assert_eq!(key, "file-key");
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let config = GenerationConfig {
            poll_interval_secs: 0,
            ..GenerationConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_save_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.gemini.api_key = "saved-key".to_string();
        config.save_to(&path).unwrap();

        let parsed: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.gemini.api_key, "saved-key");
    }

    #[test]
    fn test_configured_output_dir() {
        let mut config = Config::default();
        config.output.directory = "/tmp/shots".to_string();
        assert_eq!(config.output_dir().unwrap(), PathBuf::from("/tmp/shots"));
    }
}
