use aiscore::model::PositionReport;
use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One input row; columns beyond these are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    mmsi: u32,
    lat: f64,
    lon: f64,
    ts: String,
    #[serde(default)]
    sog: Option<f64>,
    #[serde(default)]
    cog: Option<f64>,
}

pub fn load_reports<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<PositionReport>> {
    let path_ref = path.as_ref();
    let file =
        File::open(path_ref).with_context(|| format!("opening input {}", path_ref.display()))?;
    read_reports(file).with_context(|| format!("reading input {}", path_ref.display()))
}

/// Parses a headed CSV log into validated reports, in file order.
pub fn read_reports<R: Read>(source: R) -> anyhow::Result<Vec<PositionReport>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_reader(source);

    let mut reports = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        // header occupies line 1
        let line = idx + 2;
        let row = row.with_context(|| format!("line {}: malformed row", line))?;
        let ts = parse_timestamp(&row.ts).with_context(|| format!("line {}", line))?;
        let report = PositionReport {
            mmsi: row.mmsi,
            lat: row.lat,
            lon: row.lon,
            sog: row.sog,
            cog: row.cog,
            ts,
        };
        report
            .validate()
            .map_err(|reason| anyhow!("line {}: {}", line, reason))?;
        reports.push(report);
    }
    Ok(reports)
}

/// Accepts RFC 3339, or a zone-less date-time read as UTC.
pub fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(anyhow!("unparseable timestamp {:?}", raw))
}
