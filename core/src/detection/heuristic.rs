use crate::math::GeoKinematics;
use crate::model::{Incident, IncidentKind, IncidentMetrics};
use crate::prelude::{DetectResult, DetectionStage, DetectorConfig};
use crate::telemetry::log::LogManager;
use crate::track::Track;

/// Hard kinematic ceilings applied to consecutive reports.
pub struct HeuristicDetector {
    max_speed: f64,
    max_jump: f64,
    logger: LogManager,
}

impl HeuristicDetector {
    pub fn new(max_speed: f64, max_jump: f64) -> Self {
        Self {
            max_speed,
            max_jump,
            logger: LogManager::new("heuristic"),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.max_speed, config.max_jump)
    }
}

impl DetectionStage for HeuristicDetector {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn initialize(&mut self, _tracks: &[Track]) -> DetectResult<()> {
        Ok(())
    }

    fn inspect(&self, track: &Track) -> DetectResult<Vec<Incident>> {
        let mut incidents = Vec::new();

        for window in track.points().windows(2) {
            let (prev, curr) = (&window[0], &window[1]);
            // already reported as time_order
            if track.is_order_violation(prev.seq, curr.seq) {
                continue;
            }
            let elapsed = GeoKinematics::elapsed_seconds(prev.report.ts, curr.report.ts);
            let Some(speed) = GeoKinematics::implied_speed_kn(
                prev.report.point(),
                prev.report.ts,
                curr.report.point(),
                curr.report.ts,
            ) else {
                continue;
            };
            let distance = GeoKinematics::distance_nm(prev.report.point(), curr.report.point());

            let metrics = IncidentMetrics {
                distance_nm: Some(distance),
                speed_kn: Some(speed),
                elapsed_s: Some(elapsed),
                score: None,
            };

            if distance > self.max_jump {
                let bearing = GeoKinematics::bearing_deg(prev.report.point(), curr.report.point());
                incidents.push(Incident::pair(
                    IncidentKind::Teleport,
                    track.mmsi(),
                    prev.reference(),
                    curr.reference(),
                    metrics,
                    format!(
                        "jump of {:.2} nm towards {:.0} deg exceeds {:.2} nm in {:.0}s",
                        distance, bearing, self.max_jump, elapsed
                    ),
                ));
            } else if speed > self.max_speed {
                incidents.push(Incident::pair(
                    IncidentKind::Overspeed,
                    track.mmsi(),
                    prev.reference(),
                    curr.reference(),
                    metrics,
                    format!(
                        "implied speed {:.2} kn exceeds {:.2} kn",
                        speed, self.max_speed
                    ),
                ));
            }
        }

        if !incidents.is_empty() {
            self.logger.detail(&format!(
                "mmsi {}: {} kinematic incidents",
                track.mmsi(),
                incidents.len()
            ));
        }
        Ok(incidents)
    }

    fn cleanup(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PositionReport;
    use crate::track::TrackBuilder;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn run(detector: &HeuristicDetector, reports: Vec<PositionReport>) -> Vec<Incident> {
        TrackBuilder::new()
            .build(reports)
            .iter()
            .flat_map(|track| detector.inspect(track).unwrap())
            .collect()
    }

    #[test]
    fn fast_leg_within_jump_limit_is_overspeed() {
        let detector = HeuristicDetector::new(45.0, 60.5);
        let incidents = run(
            &detector,
            vec![
                PositionReport::new(1, 0.0, 0.0, at(0)),
                PositionReport::new(1, 0.0, 1.0, at(3600)),
            ],
        );
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].kind, IncidentKind::Overspeed);
        let speed = incidents[0].metrics.speed_kn.unwrap();
        assert!((speed - 60.04).abs() < 0.05);
    }

    #[test]
    fn jump_takes_precedence_over_speed() {
        let detector = HeuristicDetector::new(45.0, 20.0);
        let incidents = run(
            &detector,
            vec![
                PositionReport::new(1, 0.0, 0.0, at(0)),
                PositionReport::new(1, 10.0, 10.0, at(1)),
            ],
        );
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].kind, IncidentKind::Teleport);
        assert!(incidents[0].metrics.distance_nm.unwrap() > 800.0);
    }

    #[test]
    fn threshold_equality_is_not_a_violation() {
        let distance = GeoKinematics::distance_nm(
            PositionReport::new(1, 0.0, 0.0, at(0)).point(),
            PositionReport::new(1, 0.0, 0.5, at(0)).point(),
        );
        // the leg takes exactly one hour, so speed equals distance
        let detector = HeuristicDetector::new(distance, distance);
        let incidents = run(
            &detector,
            vec![
                PositionReport::new(1, 0.0, 0.0, at(0)),
                PositionReport::new(1, 0.0, 0.5, at(3600)),
            ],
        );
        assert!(incidents.is_empty());
    }

    #[test]
    fn out_of_order_pair_is_not_rechecked() {
        let detector = HeuristicDetector::new(45.0, 20.0);
        let incidents = run(
            &detector,
            vec![
                PositionReport::new(1, 0.0, 0.0, at(0)),
                PositionReport::new(1, 0.0, 1.0, at(-60)),
            ],
        );
        assert!(incidents.is_empty());
    }

    #[test]
    fn duplicate_timestamps_are_skipped() {
        let detector = HeuristicDetector::new(45.0, 20.0);
        let track = TrackBuilder::new().build(vec![
            PositionReport::new(1, 0.0, 0.0, at(0)),
            PositionReport::new(1, 0.0, 5.0, at(0)),
            PositionReport::new(1, 0.0, 5.01, at(600)),
        ]);
        let incidents = detector.inspect(&track[0]).unwrap();
        assert!(incidents.is_empty());
    }

    #[test]
    fn newest_first_log_raises_no_kinematic_incidents() {
        let detector = HeuristicDetector::new(45.0, 20.0);
        let reports = (0..5000i64)
            .rev()
            .map(|i| PositionReport::new(1, 0.0, i as f64 * 0.0001, at(i * 60)))
            .collect();
        let tracks = TrackBuilder::new().build(reports);

        assert_eq!(tracks[0].order_incidents().len(), 4999);
        assert!(detector.inspect(&tracks[0]).unwrap().is_empty());
    }

    #[test]
    fn single_report_track_is_quiet() {
        let detector = HeuristicDetector::new(45.0, 20.0);
        let incidents = run(&detector, vec![PositionReport::new(1, 0.0, 0.0, at(0))]);
        assert!(incidents.is_empty());
    }
}
