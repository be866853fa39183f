//! Track anomaly-detection core for offline AIS position logs.
//!
//! Reports are grouped into per-vessel tracks, checked against kinematic
//! ceilings and optionally scored by an unsupervised outlier model. The
//! resulting incidents are merged into one reviewable report.

pub mod detection;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod telemetry;
pub mod track;

pub use pipeline::{Analysis, Pipeline};
pub use prelude::{DetectError, DetectResult, DetectionStage, DetectorConfig};
