pub struct StatsHelper;

impl StatsHelper {
    /// Percentile with linear interpolation between closest ranks.
    /// `q` is in [0, 100]; an empty slice yields `None`.
    pub fn percentile(samples: &[f64], q: f64) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let weight = rank - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
    }
}
