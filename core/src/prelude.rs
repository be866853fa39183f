use crate::model::Incident;
use crate::track::Track;
use serde::{Deserialize, Serialize};

/// Options recognized by a detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Implied-speed ceiling in knots.
    pub max_speed: f64,
    /// Jump-distance ceiling in nautical miles.
    pub max_jump: f64,
    pub ml_enabled: bool,
    /// Expected outlier fraction, strictly inside (0, 1).
    pub ml_contamination: f64,
    pub ml_trees: usize,
    pub ml_sample_size: usize,
    pub ml_seed: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_speed: 45.0,
            max_jump: 20.0,
            ml_enabled: false,
            ml_contamination: 0.02,
            ml_trees: 100,
            ml_sample_size: 256,
            ml_seed: 42,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> DetectResult<()> {
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "max_speed must be a positive number, got {}",
                self.max_speed
            )));
        }
        if !self.max_jump.is_finite() || self.max_jump <= 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "max_jump must be a positive number, got {}",
                self.max_jump
            )));
        }
        if !(self.ml_contamination > 0.0 && self.ml_contamination < 1.0) {
            return Err(DetectError::InvalidConfig(format!(
                "ml_contamination must lie in (0, 1), got {}",
                self.ml_contamination
            )));
        }
        if self.ml_trees == 0 || self.ml_sample_size == 0 {
            return Err(DetectError::InvalidConfig(
                "ml_trees and ml_sample_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Common error type for a detection pass.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type DetectResult<T> = Result<T, DetectError>;

/// A detector that turns tracks into incidents.
///
/// `initialize` sees every track once before any `inspect` call, which is
/// where detectors needing cross-vessel state (a fitted model) build it.
pub trait DetectionStage {
    fn name(&self) -> &'static str;
    fn initialize(&mut self, tracks: &[Track]) -> DetectResult<()>;
    fn inspect(&self, track: &Track) -> DetectResult<Vec<Incident>>;
    fn cleanup(&mut self);
}
