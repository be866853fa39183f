use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a flagged anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Teleport,
    Overspeed,
    TimeOrder,
    MlOutlier,
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 4] = [
        IncidentKind::Teleport,
        IncidentKind::Overspeed,
        IncidentKind::TimeOrder,
        IncidentKind::MlOutlier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentKind::Teleport => "teleport",
            IncidentKind::Overspeed => "overspeed",
            IncidentKind::TimeOrder => "time_order",
            IncidentKind::MlOutlier => "ml_outlier",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points back at one ingested report; carries enough to place a marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportRef {
    /// Zero-based position of the report in the input log.
    pub seq: usize,
    pub ts: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_nm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kn: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One flagged anomaly referencing the offending pair or a single report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub kind: IncidentKind,
    pub mmsi: u32,
    pub first: ReportRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<ReportRef>,
    pub metrics: IncidentMetrics,
    pub reason: String,
}

impl Incident {
    pub fn pair(
        kind: IncidentKind,
        mmsi: u32,
        first: ReportRef,
        second: ReportRef,
        metrics: IncidentMetrics,
        reason: String,
    ) -> Self {
        Self {
            kind,
            mmsi,
            first,
            second: Some(second),
            metrics,
            reason,
        }
    }

    pub fn single(
        kind: IncidentKind,
        mmsi: u32,
        report: ReportRef,
        metrics: IncidentMetrics,
        reason: String,
    ) -> Self {
        Self {
            kind,
            mmsi,
            first: report,
            second: None,
            metrics,
            reason,
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &ReportRef> {
        std::iter::once(&self.first).chain(self.second.iter())
    }

    pub fn earliest_ts(&self) -> DateTime<Utc> {
        match self.second {
            Some(second) if second.ts < self.first.ts => second.ts,
            _ => self.first.ts,
        }
    }

    /// Report whose position best represents the incident on a map.
    pub fn anchor(&self) -> &ReportRef {
        match &self.second {
            Some(second) if second.ts >= self.first.ts => second,
            _ => &self.first,
        }
    }
}
