use super::traits::ConfigSection;
use crate::error::PrimeFoldError;
use serde::{Deserialize, Serialize};

/// One weighted metric of the embedding fitness function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricConfig {
    pub enabled: bool,
    pub weight: f64,
}

impl MetricConfig {
    pub fn new(weight: f64) -> Self {
        Self {
            enabled: true,
            weight,
        }
    }
}

/// Weights for the five embedding metrics. Area coverage acts as a gate:
/// below its threshold the other metrics are not scored at all and the
/// total collapses to a tenth of the coverage value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub area_coverage: MetricConfig,
    pub area_coverage_threshold: f64,
    pub separation: MetricConfig,
    pub contrast: MetricConfig,
    pub significance: MetricConfig,
    pub specificity: MetricConfig,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            area_coverage: MetricConfig::new(0.50),
            area_coverage_threshold: 0.15,
            separation: MetricConfig::new(0.25),
            contrast: MetricConfig::new(0.20),
            significance: MetricConfig::new(0.10),
            specificity: MetricConfig::new(0.05),
        }
    }
}

impl FitnessConfig {
    /// Whether the random-baseline projection has to be computed.
    pub fn needs_baseline(&self) -> bool {
        self.significance.enabled || self.specificity.enabled
    }
}

impl ConfigSection for FitnessConfig {
    fn validate(&self) -> Result<(), PrimeFoldError> {
        let weights = [
            self.area_coverage.weight,
            self.separation.weight,
            self.contrast.weight,
            self.significance.weight,
            self.specificity.weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(PrimeFoldError::Configuration(
                "Fitness weights must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.area_coverage_threshold) {
            return Err(PrimeFoldError::Configuration(
                "Area coverage threshold must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}
