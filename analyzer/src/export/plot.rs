use crate::export::ensure_parent;
use aiscore::model::Report;
use aiscore::track::Track;
use anyhow::anyhow;
use plotters::prelude::*;
use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

const IMAGE_SIZE: (u32, u32) = (1200, 900);
const MIN_SPAN_DEG: f64 = 0.01;

fn plot_error<E: Display>(err: E) -> anyhow::Error {
    anyhow!("drawing plot: {}", err)
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    let span = (hi - lo).max(MIN_SPAN_DEG);
    let pad = span * 0.05;
    let mid = (lo + hi) / 2.0;
    (mid - span / 2.0 - pad)..(mid + span / 2.0 + pad)
}

/// Lon/lat window covering every track point and incident marker.
fn bounds(tracks: &[Track], report: &Report) -> (Range<f64>, Range<f64>) {
    let positions = tracks
        .iter()
        .flat_map(|track| track.reports().map(|r| (r.lon, r.lat)))
        .chain(report.incidents.iter().map(|i| (i.anchor().lon, i.anchor().lat)));

    let mut lon = (f64::INFINITY, f64::NEG_INFINITY);
    let mut lat = (f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in positions {
        lon = (lon.0.min(x), lon.1.max(x));
        lat = (lat.0.min(y), lat.1.max(y));
    }
    if lon.0 > lon.1 {
        return (-1.0..1.0, -1.0..1.0);
    }
    (padded(lon.0, lon.1), padded(lat.0, lat.1))
}

/// One line per track, incident anchors as red dots.
pub fn write(path: &Path, tracks: &[Track], report: &Report) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let (lon_range, lat_range) = bounds(tracks, report);

    let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(lon_range, lat_range)
        .map_err(plot_error)?;

    for (idx, track) in tracks.iter().enumerate() {
        let line: Vec<(f64, f64)> = track.reports().map(|r| (r.lon, r.lat)).collect();
        chart
            .draw_series(LineSeries::new(line, &Palette99::pick(idx)))
            .map_err(plot_error)?;
    }
    chart
        .draw_series(report.incidents.iter().map(|incident| {
            let anchor = incident.anchor();
            Circle::new((anchor.lon, anchor.lat), 4, RED.filled())
        }))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    log::debug!(
        "plotted {} tracks and {} incidents to {}",
        tracks.len(),
        report.incidents.len(),
        path.display()
    );
    Ok(())
}
