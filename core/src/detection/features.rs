use crate::math::GeoKinematics;
use crate::model::ReportRef;
use crate::track::Track;
use ndarray::Array2;

/// `[implied_speed_kn, distance_nm, elapsed_seconds, cog_delta_deg]`
pub const FEATURE_COUNT: usize = 4;

/// Feature vector for one report, describing its incoming leg.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub mmsi: u32,
    pub report: ReportRef,
    pub values: [f64; FEATURE_COUNT],
}

pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Rows for every point except the first of the track.
    ///
    /// Speed is the implied leg speed; when the leg has no forward time the
    /// report's own `sog` stands in, and without either the point is skipped.
    pub fn extract(track: &Track) -> Vec<FeatureRow> {
        track
            .points()
            .windows(2)
            .filter_map(|window| {
                let (prev, curr) = (&window[0].report, &window[1].report);
                let distance = GeoKinematics::distance_nm(prev.point(), curr.point());
                let elapsed = GeoKinematics::elapsed_seconds(prev.ts, curr.ts);
                let speed =
                    GeoKinematics::implied_speed_kn(prev.point(), prev.ts, curr.point(), curr.ts)
                        .or(curr.sog)?;
                let cog_delta = match (prev.cog, curr.cog) {
                    (Some(a), Some(b)) => GeoKinematics::heading_delta_deg(a, b),
                    _ => 0.0,
                };
                Some(FeatureRow {
                    mmsi: track.mmsi(),
                    report: window[1].reference(),
                    values: [speed, distance, elapsed, cog_delta],
                })
            })
            .collect()
    }

    /// Stacks rows into an `n x FEATURE_COUNT` matrix.
    pub fn to_matrix(rows: &[FeatureRow]) -> Array2<f64> {
        Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(row, col)| rows[row].values[col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PositionReport;
    use crate::track::TrackBuilder;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    #[test]
    fn first_report_has_no_row() {
        let tracks = TrackBuilder::new().build(vec![
            PositionReport::new(1, 0.0, 0.0, at(0)).with_cog(350.0),
            PositionReport::new(1, 0.0, 1.0, at(3600)).with_cog(20.0),
            PositionReport::new(1, 0.0, 1.5, at(7200)),
        ]);
        let rows = FeatureExtractor::extract(&tracks[0]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].report.seq, 1);
        assert!((rows[0].values[0] - 60.04).abs() < 0.05);
        assert_eq!(rows[0].values[2], 3600.0);
        assert_eq!(rows[0].values[3], 30.0);
        // course missing on one side
        assert_eq!(rows[1].values[3], 0.0);
    }

    #[test]
    fn zero_elapsed_leg_falls_back_to_declared_speed() {
        let tracks = TrackBuilder::new().build(vec![
            PositionReport::new(1, 0.0, 0.0, at(0)),
            PositionReport::new(1, 0.0, 0.1, at(0)).with_sog(11.0),
            PositionReport::new(1, 0.0, 0.2, at(0)),
        ]);
        let rows = FeatureExtractor::extract(&tracks[0]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values[0], 11.0);
        assert_eq!(rows[0].values[2], 0.0);
    }

    #[test]
    fn matrix_has_one_row_per_feature_row() {
        let tracks = TrackBuilder::new().build(
            (0..4)
                .map(|i| PositionReport::new(2, 0.0, i as f64 * 0.01, at(i * 60)))
                .collect(),
        );
        let rows = FeatureExtractor::extract(&tracks[0]);
        let matrix = FeatureExtractor::to_matrix(&rows);
        assert_eq!(matrix.dim(), (3, FEATURE_COUNT));
        assert_eq!(matrix[[2, 2]], 60.0);
    }
}
