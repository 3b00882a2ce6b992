use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the food files, user file and daily logs
    pub data_dir: PathBuf,
    /// Default user when `--user` is not given
    pub username: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nosh");
        Self {
            data_dir,
            username: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Read(path.clone(), e))?;
            config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(path, e))?;
        }

        if let Ok(data_dir) = std::env::var("NOSH_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(username) = std::env::var("NOSH_USER") {
            config.username = username;
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/nosh/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nosh")
            .join("config.yaml")
    }

    pub fn basic_foods_path(&self) -> PathBuf {
        self.data_dir.join("basic_foods.txt")
    }

    pub fn composite_foods_path(&self) -> PathBuf {
        self.data_dir.join("composite_foods.txt")
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.txt")
    }

    /// Per-user directory of daily log files.
    pub fn log_dir(&self, username: &str) -> PathBuf {
        self.data_dir.join("daily_logs").join(username)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config file '{0}': {1}")]
    Parse(PathBuf, #[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data_dir.to_string_lossy().contains("nosh"));
        assert_eq!(config.username, "default");
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.username, "default");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/path").unwrap();
        writeln!(file, "username: testuser").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/path"));
        assert_eq!(config.username, "testuser");
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: [not, a, path").unwrap();

        assert!(Config::load(Some(config_path)).is_err());
    }

    #[test]
    fn test_resource_paths_derive_from_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/data"),
            username: "alex".to_string(),
        };
        assert_eq!(config.basic_foods_path(), PathBuf::from("/data/basic_foods.txt"));
        assert_eq!(
            config.composite_foods_path(),
            PathBuf::from("/data/composite_foods.txt")
        );
        assert_eq!(config.users_path(), PathBuf::from("/data/users.txt"));
        assert_eq!(config.log_dir("alex"), PathBuf::from("/data/daily_logs/alex"));
    }
}
