use crate::model::incident::{Incident, IncidentKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Incident counts per kind plus pass totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_reports: usize,
    pub total_tracks: usize,
    pub total_incidents: usize,
    pub counts: BTreeMap<IncidentKind, usize>,
}

impl Summary {
    pub fn from_incidents(incidents: &[Incident], total_reports: usize, total_tracks: usize) -> Self {
        let mut counts: BTreeMap<IncidentKind, usize> =
            IncidentKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for incident in incidents {
            *counts.entry(incident.kind).or_insert(0) += 1;
        }
        Self {
            total_reports,
            total_tracks,
            total_incidents: incidents.len(),
            counts,
        }
    }

    pub fn count(&self, kind: IncidentKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Output of one detection pass, handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub incidents: Vec<Incident>,
}
