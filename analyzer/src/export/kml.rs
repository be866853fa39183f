use crate::export::write_output;
use aiscore::model::{Incident, Report};
use aiscore::track::Track;
use anyhow::Context;
use std::fmt::{self, Write as _};
use std::path::Path;

const KML_NS: &str = "http://www.opengis.net/kml/2.2";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn style(doc: &mut String, id: &str, color: &str, width: u32) -> fmt::Result {
    // KML colours are aabbggrr
    writeln!(
        doc,
        "    <Style id=\"{}\"><LineStyle><color>{}</color><width>{}</width></LineStyle></Style>",
        id, color, width
    )
}

fn describe(incident: &Incident) -> String {
    let metrics = &incident.metrics;
    let mut parts = vec![incident.reason.clone()];
    if let Some(distance) = metrics.distance_nm {
        parts.push(format!("distance_nm={:.2}", distance));
    }
    if let Some(speed) = metrics.speed_kn {
        parts.push(format!("speed_kn={:.2}", speed));
    }
    if let Some(elapsed) = metrics.elapsed_s {
        parts.push(format!("elapsed_s={:.0}", elapsed));
    }
    if let Some(score) = metrics.score {
        parts.push(format!("score={:.4}", score));
    }
    parts.join("; ")
}

pub fn render(tracks: &[Track], report: &Report) -> Result<String, fmt::Error> {
    let mut doc = String::new();
    writeln!(doc, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(doc, "<kml xmlns=\"{}\">", KML_NS)?;
    writeln!(doc, "  <Document>")?;
    style(&mut doc, "track", "ff00ffff", 2)?;
    style(&mut doc, "incident", "ff0000ff", 3)?;

    for track in tracks.iter().filter(|track| track.len() >= 2) {
        let coordinates: Vec<String> = track
            .reports()
            .map(|r| format!("{},{},0", r.lon, r.lat))
            .collect();
        writeln!(
            doc,
            "    <Placemark><name>{}</name><styleUrl>#track</styleUrl><LineString><coordinates>{}</coordinates></LineString></Placemark>",
            track.mmsi(),
            coordinates.join(" ")
        )?;
    }

    for incident in &report.incidents {
        let anchor = incident.anchor();
        writeln!(
            doc,
            "    <Placemark><name>{} ({})</name><styleUrl>#incident</styleUrl><description>{}</description><TimeStamp><when>{}</when></TimeStamp><Point><coordinates>{},{},0</coordinates></Point></Placemark>",
            incident.kind,
            incident.mmsi,
            escape(&describe(incident)),
            anchor.ts.to_rfc3339(),
            anchor.lon,
            anchor.lat
        )?;
    }

    writeln!(doc, "  </Document>\n</kml>")?;
    Ok(doc)
}

pub fn write(path: &Path, tracks: &[Track], report: &Report) -> anyhow::Result<()> {
    let document = render(tracks, report).context("rendering KML")?;
    write_output(path, &document)
}
