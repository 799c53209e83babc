use super::traits::ConfigSection;
use crate::error::PrimeFoldError;
use crate::types::{Algorithm, SearchMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LahcParams {
    pub history_length: usize,
}

impl Default for LahcParams {
    fn default() -> Self {
        Self { history_length: 50 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    pub population_size: usize,
    pub tournament_size: usize,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 10,
            tournament_size: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SaParams {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
}

impl Default for SaParams {
    fn default() -> Self {
        Self {
            initial_temperature: 10.0,
            cooling_rate: 0.99,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub mode: SearchMode,
    pub algorithm: Algorithm,
    pub max_iterations: usize,
    pub sample_size: usize,
    /// Derive g from f by a symmetry transform instead of evolving both
    /// independently. Embedding mode only.
    pub enforce_symmetry: bool,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub lahc: LahcParams,
    pub ga: GaParams,
    pub sa: SaParams,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::PrimeFold,
            algorithm: Algorithm::Lahc,
            max_iterations: 1000,
            sample_size: 200,
            enforce_symmetry: false,
            seed: None,
            lahc: LahcParams::default(),
            ga: GaParams::default(),
            sa: SaParams::default(),
        }
    }
}

impl ConfigSection for SearchConfig {
    fn validate(&self) -> Result<(), PrimeFoldError> {
        if self.max_iterations == 0 {
            return Err(PrimeFoldError::Configuration(
                "Max iterations must be at least 1".to_string(),
            ));
        }
        if self.sample_size < 10 {
            return Err(PrimeFoldError::Configuration(
                "Sample size must be at least 10".to_string(),
            ));
        }
        if self.lahc.history_length == 0 {
            return Err(PrimeFoldError::Configuration(
                "LAHC history length must be at least 1".to_string(),
            ));
        }
        if self.ga.population_size < 2 {
            return Err(PrimeFoldError::Configuration(
                "GA population size must be at least 2".to_string(),
            ));
        }
        if self.ga.tournament_size == 0 || self.ga.tournament_size > self.ga.population_size {
            return Err(PrimeFoldError::Configuration(
                "GA tournament size must be between 1 and the population size".to_string(),
            ));
        }
        if self.sa.initial_temperature <= 0.0 {
            return Err(PrimeFoldError::Configuration(
                "SA initial temperature must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.sa.cooling_rate) {
            return Err(PrimeFoldError::Configuration(
                "SA cooling rate must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}
