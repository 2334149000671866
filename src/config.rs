use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    database: String,
    static_dir: String,
    log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "~/.local/share/fyyur/fyyur.db".to_string(),
            static_dir: "static".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("fyyur").join("config.toml"))
    }

    /// Load the default config file, or built-in defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write the default config to the default path, if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory available"))?;
        if path.exists() {
            return Err(eyre!("Config file already exists: {}", path.display()));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .context(format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.database)
    }

    pub fn static_dir(&self) -> PathBuf {
        Self::expand_path(&self.static_dir)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str(r#"database = "/srv/fyyur.db""#).unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/srv/fyyur.db"));
        assert_eq!(config.static_dir(), PathBuf::from("static"));
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn expands_home_directory() {
        let config: Config = toml::from_str(r#"log_file = "~/fyyur/error.log""#).unwrap();

        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.log_file(), Some(home.join("fyyur/error.log")));
        }
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let written = toml::to_string_pretty(&Config::default()).unwrap();
        let read: Config = toml::from_str(&written).unwrap();
        assert_eq!(read, Config::default());
    }
}
