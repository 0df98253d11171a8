use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::CurrencyCode,
    errors::{AssetError, Result},
    utils::paths::{app_data_dir, config_file_in, ensure_dir, store_file_in, write_atomic},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Currency totals are shown in.
    pub base_currency: CurrencyCode,
    /// Asset store location; relative paths resolve against the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,
    #[serde(default = "default_confirm")]
    pub confirm_destructive: bool,
}

fn default_confirm() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: CurrencyCode::cny(),
            store_file: None,
            confirm_destructive: default_confirm(),
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config
            .base_currency
            .validate("base_currency")
            .map_err(AssetError::Config)?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    /// Where the asset store lives under `config`.
    pub fn store_path(&self, config: &Config) -> PathBuf {
        match &config.store_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base.join(path),
            None => store_file_in(&self.base),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        let config = manager.load().expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(manager.store_path(&config), temp.path().join("assets.json"));
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        let config = Config {
            base_currency: CurrencyCode::new("usd"),
            store_file: Some(PathBuf::from("data/portfolio.json")),
            confirm_destructive: false,
        };
        manager.save(&config).expect("save");

        let loaded = manager.load().expect("load");
        assert_eq!(loaded.base_currency.as_str(), "USD");
        assert!(!loaded.confirm_destructive);
        assert_eq!(
            manager.store_path(&loaded),
            temp.path().join("data").join("portfolio.json")
        );
    }

    #[test]
    fn malformed_currency_is_a_config_error() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        fs::write(manager.path(), r#"{ "base_currency": "US" }"#).expect("write");
        let err = manager.load().expect_err("invalid currency");
        assert!(matches!(err, AssetError::Config(_)));
    }
}
