use crate::constants::{DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use crate::errors::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub model: String,
    pub system_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_key: None,
            log_level: "info".to_string(),
            log_dir: None,
            api_log: None,
        }
    }
}

/// Loads `~/.config/integrai/config.json` (writing defaults if it is missing),
/// then applies environment overrides.
pub fn initialize_config() -> ChatResult<Config> {
    let config_path = get_config_path()?;
    let mut config = load_or_create(&config_path)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

/// Reads the config at `path`, or writes the defaults there if it does not exist.
pub fn load_or_create(path: &Path) -> ChatResult<Config> {
    if path.exists() {
        let config_str = fs::read_to_string(path).map_err(|e| {
            ChatError::config_error(format!("Failed to read config file: {}", e))
        })?;
        return serde_json::from_str(&config_str)
            .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)));
    }

    let config = Config::default();
    write_config(path, &config)?;
    Ok(config)
}

fn write_config(path: &Path, config: &Config) -> ChatResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(config)
        .map_err(|e| ChatError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to write config file: {}", e)))
}

/// Environment wins over the file: `INTEGRAI_API_URL`, `INTEGRAI_MODEL`, `INTEGRAI_API_KEY`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("INTEGRAI_API_URL") {
        config.api_url = url;
    }
    if let Some(model) = lookup("INTEGRAI_MODEL") {
        config.model = model;
    }
    if let Some(key) = lookup("INTEGRAI_API_KEY").filter(|k| !k.is_empty()) {
        config.api_key = Some(key);
    }
}

pub fn config_dir() -> ChatResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("integrai"))
}

fn get_config_path() -> ChatResult<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    if config.api_url.is_empty() {
        return Err(ChatError::config_error("api_url is required"));
    }
    let url = reqwest::Url::parse(&config.api_url)
        .map_err(|e| ChatError::config_error(format!("Invalid api_url: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChatError::config_error("api_url must use http or https"));
    }

    if config.model.is_empty() {
        return Err(ChatError::config_error("Model name is required"));
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(ChatError::config_error(format!(
            "log_level must be one of {}",
            LOG_LEVELS.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_invalid_url() {
        let mut config = Config::default();
        config.api_url = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        config.api_url = "ftp://example.com/chat".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_empty_model() {
        let mut config = Config::default();
        config.model = "".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_log_level() {
        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model": "mistral"}"#).unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(load_or_create(&path), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("INTEGRAI_API_URL", "https://chat.example.com/v1"),
            ("INTEGRAI_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url, "https://chat.example.com/v1");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
