use crate::export::write_output;
use aiscore::model::Report;
use aiscore::track::Track;
use anyhow::Context;
use serde_json::{json, Value};
use std::path::Path;

/// `LineString` per track with two or more points, `Point` per incident.
pub fn render(tracks: &[Track], report: &Report) -> Value {
    let lines = tracks.iter().filter(|track| track.len() >= 2).map(|track| {
        let coordinates: Vec<[f64; 2]> = track.reports().map(|r| [r.lon, r.lat]).collect();
        json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coordinates },
            "properties": { "mmsi": track.mmsi() }
        })
    });

    let points = report.incidents.iter().map(|incident| {
        let anchor = incident.anchor();
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [anchor.lon, anchor.lat] },
            "properties": {
                "kind": incident.kind,
                "mmsi": incident.mmsi,
                "ts": anchor.ts,
                "metrics": incident.metrics,
                "reason": incident.reason,
            }
        })
    });

    json!({
        "type": "FeatureCollection",
        "features": lines.chain(points).collect::<Vec<_>>(),
    })
}

pub fn write(path: &Path, tracks: &[Track], report: &Report) -> anyhow::Result<()> {
    let document =
        serde_json::to_string_pretty(&render(tracks, report)).context("serializing GeoJSON")?;
    write_output(path, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiscore::model::PositionReport;
    use aiscore::{DetectorConfig, Pipeline};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn features_cover_tracks_and_incidents() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let analysis = Pipeline::new(DetectorConfig::default())
            .unwrap()
            .analyze(vec![
                PositionReport::new(1, 0.0, 0.0, t0),
                PositionReport::new(1, 0.0, 1.0, t0 + Duration::minutes(30)),
                PositionReport::new(2, 5.0, 5.0, t0),
            ])
            .unwrap();

        let value = render(&analysis.tracks, &analysis.report);
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(features[0]["geometry"]["coordinates"][1][0], 1.0);
        assert_eq!(features[1]["geometry"]["type"], "Point");
        assert_eq!(features[1]["properties"]["kind"], "teleport");
        assert_eq!(features[1]["geometry"]["coordinates"][0], 1.0);
    }
}
