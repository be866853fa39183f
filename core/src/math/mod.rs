pub mod forest;
pub mod geo;
pub mod stats;

pub use forest::{IsolationForest, OutlierModel};
pub use geo::GeoKinematics;
pub use stats::StatsHelper;
