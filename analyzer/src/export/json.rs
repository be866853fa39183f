use crate::export::write_output;
use aiscore::model::{Incident, Report, Summary};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    input: &'a str,
    summary: &'a Summary,
    incidents: &'a [Incident],
}

pub fn render(input: &str, report: &Report) -> anyhow::Result<String> {
    let document = JsonReport {
        input,
        summary: &report.summary,
        incidents: &report.incidents,
    };
    serde_json::to_string_pretty(&document).context("serializing JSON report")
}

pub fn write(path: &Path, input: &str, report: &Report) -> anyhow::Result<()> {
    write_output(path, &render(input, report)?)
}
