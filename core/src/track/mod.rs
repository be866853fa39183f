pub mod builder;

pub use builder::TrackBuilder;

use crate::model::{Incident, PositionReport, ReportRef};
use std::collections::HashSet;

/// A report as placed in a track, tagged with its position in the input log.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub seq: usize,
    pub report: PositionReport,
    /// True when `report.sog` was filled from the previous point.
    pub sog_derived: bool,
}

impl TrackPoint {
    pub fn reference(&self) -> ReportRef {
        ReportRef {
            seq: self.seq,
            ts: self.report.ts,
            lat: self.report.lat,
            lon: self.report.lon,
        }
    }
}

/// One vessel's reports in timestamp order, plus the as-observed order.
#[derive(Debug, Clone)]
pub struct Track {
    mmsi: u32,
    points: Vec<TrackPoint>,
    ingest_order: Vec<usize>,
    /// Out-of-order `(seq, seq)` pairs, stored in both orientations.
    order_violations: HashSet<(usize, usize)>,
    order_incidents: Vec<Incident>,
}

impl Track {
    pub fn mmsi(&self) -> u32 {
        self.mmsi
    }

    /// Points sorted by timestamp; equal timestamps keep ingestion order.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn reports(&self) -> impl Iterator<Item = &PositionReport> {
        self.points.iter().map(|point| &point.report)
    }

    /// Points in the order they appeared in the input log.
    pub fn ingest_order(&self) -> impl Iterator<Item = &TrackPoint> {
        self.ingest_order.iter().map(move |idx| &self.points[*idx])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `time_order` incidents found while building the track.
    pub fn order_incidents(&self) -> &[Incident] {
        &self.order_incidents
    }

    /// Whether the two reports were observed as an out-of-order adjacent pair.
    pub fn is_order_violation(&self, seq_a: usize, seq_b: usize) -> bool {
        self.order_violations.contains(&(seq_a, seq_b))
    }
}
