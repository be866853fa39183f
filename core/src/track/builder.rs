use crate::math::GeoKinematics;
use crate::model::{Incident, IncidentKind, IncidentMetrics, PositionReport};
use crate::telemetry::log::LogManager;
use crate::track::{Track, TrackPoint};
use std::collections::{BTreeMap, HashSet};

/// Groups a flat report stream into per-vessel tracks.
pub struct TrackBuilder {
    logger: LogManager,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("tracks"),
        }
    }

    /// Builds one track per MMSI, ordered by MMSI.
    pub fn build(&self, reports: Vec<PositionReport>) -> Vec<Track> {
        let mut groups: BTreeMap<u32, Vec<TrackPoint>> = BTreeMap::new();
        for (seq, report) in reports.into_iter().enumerate() {
            groups.entry(report.mmsi).or_default().push(TrackPoint {
                seq,
                report,
                sog_derived: false,
            });
        }

        let tracks: Vec<Track> = groups
            .into_iter()
            .map(|(mmsi, observed)| self.build_track(mmsi, observed))
            .collect();

        let violations: usize = tracks.iter().map(|t| t.order_incidents().len()).sum();
        self.logger.record(&format!(
            "built {} tracks, {} ordering violations",
            tracks.len(),
            violations
        ));
        tracks
    }

    fn build_track(&self, mmsi: u32, observed: Vec<TrackPoint>) -> Track {
        let (order_incidents, order_violations) = Self::scan_ordering(mmsi, &observed);

        // stable: equal timestamps keep their ingestion order
        let mut by_time: Vec<usize> = (0..observed.len()).collect();
        by_time.sort_by_key(|&idx| observed[idx].report.ts);

        let mut ingest_order = vec![0; observed.len()];
        for (sorted_idx, &observed_idx) in by_time.iter().enumerate() {
            ingest_order[observed_idx] = sorted_idx;
        }

        let mut slots: Vec<Option<TrackPoint>> = observed.into_iter().map(Some).collect();
        let mut points: Vec<TrackPoint> = by_time
            .iter()
            .filter_map(|&idx| slots[idx].take())
            .collect();

        let filled = Self::fill_missing_sog(&mut points);
        if filled > 0 {
            self.logger
                .detail(&format!("mmsi {}: derived sog for {} reports", mmsi, filled));
        }

        Track {
            mmsi,
            points,
            ingest_order,
            order_violations,
            order_incidents,
        }
    }

    /// Flags every adjacent as-observed pair whose timestamp does not advance.
    fn scan_ordering(
        mmsi: u32,
        observed: &[TrackPoint],
    ) -> (Vec<Incident>, HashSet<(usize, usize)>) {
        let mut incidents = Vec::new();
        let mut pairs = HashSet::new();
        for window in observed.windows(2) {
            let (prev, curr) = (&window[0], &window[1]);
            if curr.report.ts > prev.report.ts {
                continue;
            }
            let delta = GeoKinematics::elapsed_seconds(prev.report.ts, curr.report.ts);
            let reason = if delta == 0.0 {
                format!("repeated timestamp {}", curr.report.ts.to_rfc3339())
            } else {
                format!(
                    "timestamp steps back {:.0}s ({} after {})",
                    -delta,
                    curr.report.ts.to_rfc3339(),
                    prev.report.ts.to_rfc3339()
                )
            };
            incidents.push(Incident::pair(
                IncidentKind::TimeOrder,
                mmsi,
                prev.reference(),
                curr.reference(),
                IncidentMetrics {
                    elapsed_s: Some(delta),
                    ..Default::default()
                },
                reason,
            ));
            pairs.insert((prev.seq, curr.seq));
            pairs.insert((curr.seq, prev.seq));
        }
        (incidents, pairs)
    }

    /// Fills absent `sog` from the previous point in time order.
    fn fill_missing_sog(points: &mut [TrackPoint]) -> usize {
        let mut filled = 0;
        for idx in 1..points.len() {
            if points[idx].report.sog.is_some() {
                continue;
            }
            let prev = &points[idx - 1].report;
            let curr = &points[idx].report;
            if let Some(speed) =
                GeoKinematics::implied_speed_kn(prev.point(), prev.ts, curr.point(), curr.ts)
            {
                points[idx].report.sog = Some(speed);
                points[idx].sog_derived = true;
                filled += 1;
            }
        }
        filled
    }
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self::new()
    }
}
