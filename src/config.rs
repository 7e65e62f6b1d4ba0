//! Analysis configuration
//!
//! Defaults reproduce the production constants. A YAML file can override any
//! subset of fields; missing fields keep their default.

use crate::survey::DimensionCode;
use percepta_graph_algorithms::LeidenConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parameters of the adaptive threshold bisection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Lower bound of the accepted edge density band
    pub min_density: f64,
    /// Upper bound of the accepted edge density band
    pub max_density: f64,
    /// Hard cap on bisection steps
    pub max_steps: usize,
    /// Bisection stops once the bracket is narrower than this
    pub tolerance: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_density: 0.10,
            max_density: 0.30,
            max_steps: 40,
            tolerance: 1e-6,
        }
    }
}

/// Parameters of the repeated community detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Number of independent detection runs (K)
    pub iterations: usize,
    /// Up to this many runs every pair is compared
    pub exhaustive_limit: usize,
    /// Number of sampled run pairs above the exhaustive limit
    pub sampled_pairs: usize,
    /// Seed for the pair sampler
    pub sampling_seed: u64,
    pub leiden: LeidenConfig,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            exhaustive_limit: 20,
            sampled_pairs: 200,
            sampling_seed: 42,
            leiden: LeidenConfig::default(),
        }
    }
}

/// Full analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_respondents: usize,
    /// Outcome dimension left out of similarity vectors
    pub excluded_dimension: DimensionCode,
    pub scale_max: i32,
    pub default_department: String,
    pub threshold: ThresholdConfig,
    pub stability: StabilityConfig,
    /// Respondents per response query
    pub response_batch_size: usize,
    /// Analysis type under which reports are stored
    pub analysis_type: String,
    pub render_image: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_respondents: 10,
            excluded_dimension: DimensionCode::new("ENG"),
            scale_max: 5,
            default_department: "Sin departamento".to_string(),
            threshold: ThresholdConfig::default(),
            stability: StabilityConfig::default(),
            response_batch_size: 50,
            analysis_type: "ona_network".to_string(),
            render_image: true,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a YAML file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse a YAML document and validate it
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_respondents < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_respondents must be at least 2, got {}",
                self.min_respondents
            )));
        }
        if self.scale_max < 1 {
            return Err(ConfigError::Invalid(format!("scale_max must be positive, got {}", self.scale_max)));
        }

        let t = &self.threshold;
        if !(0.0..=1.0).contains(&t.min_density) || !(0.0..=1.0).contains(&t.max_density) {
            return Err(ConfigError::Invalid("density band must lie within [0, 1]".to_string()));
        }
        if t.min_density > t.max_density {
            return Err(ConfigError::Invalid(format!(
                "min_density ({}) exceeds max_density ({})",
                t.min_density, t.max_density
            )));
        }
        if t.max_steps == 0 || t.tolerance <= 0.0 {
            return Err(ConfigError::Invalid(
                "threshold search needs max_steps > 0 and tolerance > 0".to_string(),
            ));
        }

        let s = &self.stability;
        if s.iterations == 0 {
            return Err(ConfigError::Invalid("stability.iterations must be at least 1".to_string()));
        }
        if s.leiden.resolution <= 0.0 || s.leiden.iterations == 0 {
            return Err(ConfigError::Invalid(
                "leiden needs a positive resolution and at least one iteration".to_string(),
            ));
        }

        if self.response_batch_size == 0 {
            return Err(ConfigError::Invalid("response_batch_size must be at least 1".to_string()));
        }
        if self.analysis_type.is_empty() || self.analysis_type.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "analysis_type must be non-empty and free of ':', got {:?}",
                self.analysis_type
            )));
        }

        Ok(())
    }
}
