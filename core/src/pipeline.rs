use crate::detection::{AnomalyScorer, HeuristicDetector, IncidentAggregator};
use crate::model::{Incident, PositionReport, Report};
use crate::prelude::{DetectError, DetectResult, DetectionStage, DetectorConfig};
use crate::telemetry::log::LogManager;
use crate::track::{Track, TrackBuilder};

/// Tracks and report produced by one detection pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub tracks: Vec<Track>,
    pub report: Report,
}

/// Runs track building, every enabled detector and aggregation in one pass.
pub struct Pipeline {
    config: DetectorConfig,
    logger: LogManager,
}

impl Pipeline {
    /// Fails if the configuration is invalid, before any report is touched.
    pub fn new(config: DetectorConfig) -> DetectResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            logger: LogManager::new("pipeline"),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect(&self, reports: Vec<PositionReport>) -> DetectResult<Report> {
        self.analyze(reports).map(|analysis| analysis.report)
    }

    pub fn analyze(&self, reports: Vec<PositionReport>) -> DetectResult<Analysis> {
        for (seq, report) in reports.iter().enumerate() {
            report
                .validate()
                .map_err(|reason| DetectError::InvalidInput(format!("report {}: {}", seq, reason)))?;
        }

        let total_reports = reports.len();
        let tracks = TrackBuilder::new().build(reports);

        let mut aggregator = IncidentAggregator::new();
        aggregator.extend(
            tracks
                .iter()
                .flat_map(|track| track.order_incidents().iter().cloned()),
        );

        for mut stage in self.stages() {
            let incidents = Self::run_stage(stage.as_mut(), &tracks);
            stage.cleanup();
            let incidents = incidents?;
            self.logger
                .record(&format!("{} raised {} incidents", stage.name(), incidents.len()));
            aggregator.extend(incidents);
        }

        let report = aggregator.finish(total_reports, tracks.len());
        self.logger.record(&format!(
            "{} reports, {} tracks, {} incidents",
            report.summary.total_reports, report.summary.total_tracks, report.summary.total_incidents
        ));
        Ok(Analysis { tracks, report })
    }

    fn stages(&self) -> Vec<Box<dyn DetectionStage>> {
        let mut stages: Vec<Box<dyn DetectionStage>> =
            vec![Box::new(HeuristicDetector::from_config(&self.config))];
        if self.config.ml_enabled {
            stages.push(Box::new(AnomalyScorer::from_config(&self.config)));
        }
        stages
    }

    fn run_stage(stage: &mut dyn DetectionStage, tracks: &[Track]) -> DetectResult<Vec<Incident>> {
        stage.initialize(tracks)?;
        let mut incidents = Vec::new();
        for track in tracks {
            incidents.extend(stage.inspect(track)?);
        }
        Ok(incidents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IncidentKind;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 10, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn pipeline(config: DetectorConfig) -> Pipeline {
        Pipeline::new(config).unwrap()
    }

    #[test]
    fn empty_log_gives_empty_report() {
        let report = pipeline(DetectorConfig {
            ml_enabled: true,
            ..Default::default()
        })
        .detect(Vec::new())
        .unwrap();
        assert!(report.incidents.is_empty());
        assert_eq!(report.summary.total_reports, 0);
        assert_eq!(report.summary.total_tracks, 0);
        assert!(report.summary.counts.values().all(|count| *count == 0));
    }

    #[test]
    fn invalid_config_fails_before_processing() {
        let result = Pipeline::new(DetectorConfig {
            ml_contamination: 1.2,
            ..Default::default()
        });
        assert!(matches!(result, Err(DetectError::InvalidConfig(_))));
    }

    #[test]
    fn invalid_report_aborts_whole_pass() {
        let result = pipeline(DetectorConfig::default()).detect(vec![
            PositionReport::new(1, 0.0, 0.0, at(0)),
            PositionReport::new(1, 95.0, 0.0, at(60)),
        ]);
        assert!(matches!(result, Err(DetectError::InvalidInput(_))));
    }

    #[test]
    fn overspeed_scenario_on_the_equator() {
        let report = pipeline(DetectorConfig {
            max_speed: 45.0,
            max_jump: 60.5,
            ..Default::default()
        })
        .detect(vec![
            PositionReport::new(1, 0.0, 0.0, at(0)),
            PositionReport::new(1, 0.0, 1.0, at(3600)),
        ])
        .unwrap();
        assert_eq!(report.summary.count(IncidentKind::Overspeed), 1);
        assert_eq!(report.summary.count(IncidentKind::Teleport), 0);
        assert_eq!(report.incidents.len(), 1);
    }

    #[test]
    fn reversed_pair_yields_only_time_order() {
        let report = pipeline(DetectorConfig::default())
            .detect(vec![
                PositionReport::new(5, 0.0, 0.0, at(0)),
                PositionReport::new(5, 0.0, 1.0, at(-60)),
            ])
            .unwrap();
        assert_eq!(report.summary.count(IncidentKind::TimeOrder), 1);
        assert_eq!(report.summary.total_incidents, 1);
    }

    #[test]
    fn single_report_track_is_quiet_with_all_detectors() {
        let analysis = pipeline(DetectorConfig {
            ml_enabled: true,
            ..Default::default()
        })
        .analyze(vec![PositionReport::new(3, 1.0, 1.0, at(0))])
        .unwrap();
        assert_eq!(analysis.tracks.len(), 1);
        assert!(analysis.report.incidents.is_empty());
    }

    #[test]
    fn mixed_log_counts_add_up() {
        let mut reports = Vec::new();
        for step in 0..20i64 {
            reports.push(PositionReport::new(11, 0.0, step as f64 * 0.01, at(step * 60)));
        }
        reports.push(PositionReport::new(22, 0.0, 0.0, at(0)));
        reports.push(PositionReport::new(22, 10.0, 10.0, at(1)));
        reports.push(PositionReport::new(22, 10.0, 10.0, at(-5)));

        let report = pipeline(DetectorConfig {
            ml_enabled: true,
            ..Default::default()
        })
        .detect(reports)
        .unwrap();

        let total: usize = report.summary.counts.values().sum();
        assert_eq!(total, report.incidents.len());
        assert_eq!(report.summary.total_reports, 23);
        assert_eq!(report.summary.total_tracks, 2);
        assert!(report.summary.count(IncidentKind::TimeOrder) >= 1);
        let keys: Vec<_> = report
            .incidents
            .iter()
            .map(|i| (i.mmsi, i.earliest_ts()))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
}
