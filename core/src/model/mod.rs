pub mod incident;
pub mod report;
pub mod summary;

pub use incident::{Incident, IncidentKind, IncidentMetrics, ReportRef};
pub use report::{GeoPoint, PositionReport};
pub use summary::{Report, Summary};
