pub mod aggregator;
pub mod features;
pub mod heuristic;
pub mod scorer;

pub use aggregator::IncidentAggregator;
pub use features::{FeatureExtractor, FeatureRow, FEATURE_COUNT};
pub use heuristic::HeuristicDetector;
pub use scorer::AnomalyScorer;
