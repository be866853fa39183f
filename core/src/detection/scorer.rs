use crate::detection::features::{FeatureExtractor, FeatureRow};
use crate::math::{IsolationForest, OutlierModel, StatsHelper};
use crate::model::{Incident, IncidentKind, IncidentMetrics};
use crate::prelude::{DetectError, DetectResult, DetectionStage, DetectorConfig};
use crate::telemetry::log::LogManager;
use crate::track::Track;
use std::collections::BTreeMap;

/// Below this many feature rows the model is not fitted at all.
pub const MIN_SAMPLES: usize = 2;

/// Fits an isolation forest over every track's legs and flags the
/// lowest-scoring fraction as `ml_outlier`.
pub struct AnomalyScorer {
    contamination: f64,
    forest: IsolationForest,
    flagged: BTreeMap<u32, Vec<(FeatureRow, f64)>>,
    threshold: Option<f64>,
    logger: LogManager,
}

impl AnomalyScorer {
    pub fn new(contamination: f64, forest: IsolationForest) -> Self {
        Self {
            contamination,
            forest,
            flagged: BTreeMap::new(),
            threshold: None,
            logger: LogManager::new("scorer"),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.ml_contamination,
            IsolationForest::new(config.ml_trees, config.ml_sample_size, config.ml_seed),
        )
    }

    /// Score cut-off of the last fit, if one happened.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.values().map(Vec::len).sum()
    }
}

impl DetectionStage for AnomalyScorer {
    fn name(&self) -> &'static str {
        "anomaly-scorer"
    }

    fn initialize(&mut self, tracks: &[Track]) -> DetectResult<()> {
        self.flagged.clear();
        self.threshold = None;

        let rows: Vec<FeatureRow> = tracks.iter().flat_map(FeatureExtractor::extract).collect();
        if rows.len() < MIN_SAMPLES {
            self.logger.caution(&format!(
                "skipping outlier scoring: {} feature rows, need {}",
                rows.len(),
                MIN_SAMPLES
            ));
            return Ok(());
        }

        let matrix = FeatureExtractor::to_matrix(&rows);
        self.forest.fit(matrix.view())?;
        let scores = self.forest.score_samples(matrix.view())?;
        let scores = scores.to_vec();
        let threshold = StatsHelper::percentile(&scores, self.contamination * 100.0)
            .ok_or_else(|| DetectError::Internal("no scores to threshold".into()))?;

        for (row, score) in rows.into_iter().zip(scores) {
            if score < threshold {
                self.flagged.entry(row.mmsi).or_default().push((row, score));
            }
        }
        self.threshold = Some(threshold);
        self.logger.record(&format!(
            "scored {} legs, threshold {:.4}, {} outliers",
            matrix.nrows(),
            threshold,
            self.flagged_count()
        ));
        Ok(())
    }

    fn inspect(&self, track: &Track) -> DetectResult<Vec<Incident>> {
        let Some(rows) = self.flagged.get(&track.mmsi()) else {
            return Ok(Vec::new());
        };
        let threshold = self.threshold.unwrap_or_default();
        Ok(rows
            .iter()
            .map(|(row, score)| {
                let [speed, distance, elapsed, _] = row.values;
                Incident::single(
                    IncidentKind::MlOutlier,
                    row.mmsi,
                    row.report,
                    IncidentMetrics {
                        distance_nm: Some(distance),
                        speed_kn: Some(speed),
                        elapsed_s: Some(elapsed),
                        score: Some(*score),
                    },
                    format!(
                        "anomaly score {:.4} below cut-off {:.4}",
                        score, threshold
                    ),
                )
            })
            .collect())
    }

    fn cleanup(&mut self) {
        self.flagged.clear();
        self.threshold = None;
    }
}
