use crate::model::{Incident, Report, Summary};

/// Merges incidents from every stage into one ordered report.
pub struct IncidentAggregator {
    incidents: Vec<Incident>,
}

impl IncidentAggregator {
    pub fn new() -> Self {
        Self {
            incidents: Vec::new(),
        }
    }

    pub fn extend<I>(&mut self, incidents: I)
    where
        I: IntoIterator<Item = Incident>,
    {
        self.incidents.extend(incidents);
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Orders by `(mmsi, earliest referenced ts)`; ties keep arrival order.
    pub fn finish(mut self, total_reports: usize, total_tracks: usize) -> Report {
        self.incidents
            .sort_by(|a, b| (a.mmsi, a.earliest_ts()).cmp(&(b.mmsi, b.earliest_ts())));
        let summary = Summary::from_incidents(&self.incidents, total_reports, total_tracks);
        Report {
            summary,
            incidents: self.incidents,
        }
    }
}

impl Default for IncidentAggregator {
    fn default() -> Self {
        Self::new()
    }
}
