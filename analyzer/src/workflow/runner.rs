use crate::ingest::csv::load_reports;
use crate::workflow::config::WorkflowConfig;
use aiscore::model::PositionReport;
use aiscore::{Analysis, Pipeline};
use anyhow::Context;
use std::path::Path;

pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute(&self, input: &Path) -> anyhow::Result<Analysis> {
        let reports = load_reports(input)?;
        log::info!("loaded {} reports from {}", reports.len(), input.display());
        self.analyze(reports)
    }

    pub fn analyze(&self, reports: Vec<PositionReport>) -> anyhow::Result<Analysis> {
        let pipeline =
            Pipeline::new(self.config.detector.clone()).context("validating detector config")?;
        pipeline.analyze(reports).context("running detection pass")
    }
}
