use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub git: GitConfig,
    pub ui: UIConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GitHubConfig {
    /// Repository owner (user or organization); inferred from the remote when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Repository name; inferred from the remote when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub api_url: String,
    pub token_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GitConfig {
    pub remote: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct UIConfig {
    pub tick_rate_ms: u64,
    pub max_files_display: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    pub log_commands: bool,
    /// Pop changes parked by "leave changes" when returning to their branch
    pub restore_parked_changes: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            token: None,
            timeout_seconds: 15,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            max_files_display: 50,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_commands: true,
            restore_parked_changes: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitpanel"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default file, or defaults when there is none
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file with owner-only permissions
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // The file may hold a token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.github.api_url.starts_with("http://") && !self.github.api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.github.api_url
            )));
        }

        if self.github.timeout_seconds == 0 || self.git.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.git.remote.trim().is_empty() || self.git.remote.starts_with('-') {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid remote name: '{}'",
                self.git.remote
            )));
        }

        if self.ui.tick_rate_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "tick_rate_ms must be greater than 0".to_string(),
            ));
        }

        if self.ui.max_files_display == 0 {
            return Err(ConfigError::InvalidValue(
                "max_files_display must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the GitHub token from the environment variable or the config file
    pub fn get_token(&self) -> Option<String> {
        if let Ok(token) = std::env::var(&self.github.token_env)
            && !token.is_empty()
        {
            return Some(token);
        }

        self.github.token.clone().filter(|t| !t.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }
}
