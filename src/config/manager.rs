use super::{fitness::FitnessConfig, search::SearchConfig, traits::ConfigSection};
use crate::error::PrimeFoldError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub fitness: FitnessConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), PrimeFoldError> {
        self.search.validate()?;
        self.fitness.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Layer a TOML or JSON file over the defaults. Missing keys keep their
    /// default values.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PrimeFoldError> {
        let defaults = config::Config::try_from(&AppConfig::default()).map_err(|e| {
            PrimeFoldError::Configuration(format!("Failed to build defaults: {}", e))
        })?;

        let layered = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path.as_ref()))
            .build()
            .map_err(|e| PrimeFoldError::Configuration(format!("Failed to read config: {}", e)))?;

        let parsed: AppConfig = layered.try_deserialize().map_err(|e| {
            PrimeFoldError::Configuration(format!("Failed to parse config: {}", e))
        })?;

        parsed.validate()?;

        *self.config.write().expect("config lock poisoned") = parsed;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PrimeFoldError> {
        let config = self.config.read().expect("config lock poisoned");
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| PrimeFoldError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| PrimeFoldError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().expect("config lock poisoned").clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), PrimeFoldError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().expect("config lock poisoned");
        f(&mut config);
        config.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Algorithm, SearchMode};

    #[test]
    fn test_defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_update_rejects_invalid() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.search.max_iterations = 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = std::env::temp_dir();
        let path = dir.join("primefold-config-partial.toml");
        std::fs::write(
            &path,
            "[search]\nmode = \"primegen\"\nalgorithm = \"sa\"\nmax_iterations = 250\n",
        )
        .unwrap();

        let manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.get();
        assert_eq!(config.search.mode, SearchMode::PrimeGen);
        assert_eq!(config.search.algorithm, Algorithm::Sa);
        assert_eq!(config.search.max_iterations, 250);
        // Untouched keys fall back to defaults.
        assert_eq!(config.search.sample_size, 200);
        assert!((config.fitness.separation.weight - 0.25).abs() < 1e-12);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_round_trip_through_toml() {
        let dir = std::env::temp_dir();
        let path = dir.join("primefold-config-roundtrip.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.search.max_iterations = 777;
                c.fitness.contrast.weight = 0.33;
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::new();
        loaded.load_from_file(&path).unwrap();
        assert_eq!(loaded.get().search.max_iterations, 777);
        assert!((loaded.get().fitness.contrast.weight - 0.33).abs() < 1e-12);

        std::fs::remove_file(&path).ok();
    }
}
