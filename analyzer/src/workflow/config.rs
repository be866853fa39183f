use aiscore::DetectorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Detection options plus optional map outputs, loadable from YAML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    #[serde(flatten)]
    pub detector: DetectorConfig,
    pub geojson: Option<PathBuf>,
    pub kml: Option<PathBuf>,
    pub plot: Option<PathBuf>,
}

/// Command-line values that take precedence over the workflow file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub max_speed: Option<f64>,
    pub max_jump: Option<f64>,
    /// `Some(false)` switches scoring off even if the file enables it.
    pub ml: Option<bool>,
    pub contamination: Option<f64>,
    pub geojson: Option<PathBuf>,
    pub kml: Option<PathBuf>,
    pub plot: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(max_speed) = overrides.max_speed {
            self.detector.max_speed = max_speed;
        }
        if let Some(max_jump) = overrides.max_jump {
            self.detector.max_jump = max_jump;
        }
        if let Some(ml) = overrides.ml {
            self.detector.ml_enabled = ml;
        }
        if let Some(contamination) = overrides.contamination {
            self.detector.ml_contamination = contamination;
        }
        if overrides.geojson.is_some() {
            self.geojson = overrides.geojson;
        }
        if overrides.kml.is_some() {
            self.kml = overrides.kml;
        }
        if overrides.plot.is_some() {
            self.plot = overrides.plot;
        }
        self
    }
}
