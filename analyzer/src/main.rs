use clap::{Parser, Subcommand};
use export::{geojson, json, kml, plot};
use ingest::nmea;
use std::path::PathBuf;
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::Runner;

mod export;
mod ingest;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline AIS track anomaly detection")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect anomalies in a CSV log of position reports
    Detect {
        #[arg(long = "in")]
        input: PathBuf,
        /// JSON report destination
        #[arg(long)]
        report: PathBuf,
        #[arg(long)]
        geojson: Option<PathBuf>,
        #[arg(long)]
        kml: Option<PathBuf>,
        /// PNG of track lines with incidents marked in red
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Load detection options from YAML; flags below override it
        #[arg(long)]
        workflow: Option<PathBuf>,
        /// Max plausible speed (knots)
        #[arg(long)]
        max_speed: Option<f64>,
        /// Max distance between consecutive reports (nautical miles)
        #[arg(long)]
        max_jump: Option<f64>,
        /// Enable isolation-forest outlier scoring
        #[arg(long, default_value_t = false, conflicts_with = "no_ml")]
        ml: bool,
        /// Disable outlier scoring even if the workflow file enables it
        #[arg(long, default_value_t = false)]
        no_ml: bool,
        /// Expected outlier fraction for the scorer
        #[arg(long)]
        contamination: Option<f64>,
    },
    /// Validate NMEA checksums and print framing statistics
    Parse {
        #[arg(long = "in")]
        input: PathBuf,
        /// Optional CSV export of every AIS sentence
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn ml_override(ml: bool, no_ml: bool) -> Option<bool> {
    match (ml, no_ml) {
        (_, true) => Some(false),
        (true, false) => Some(true),
        (false, false) => None,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Detect {
            input,
            report,
            geojson: geojson_path,
            kml: kml_path,
            plot: plot_path,
            workflow,
            max_speed,
            max_jump,
            ml,
            no_ml,
            contamination,
        } => {
            let base = match workflow {
                Some(path) => WorkflowConfig::load(path)?,
                None => WorkflowConfig::default(),
            };
            let config = base.with_overrides(Overrides {
                max_speed,
                max_jump,
                ml: ml_override(ml, no_ml),
                contamination,
                geojson: geojson_path,
                kml: kml_path,
                plot: plot_path,
            });

            let runner = Runner::new(config);
            let analysis = runner.execute(&input)?;

            json::write(&report, &input.display().to_string(), &analysis.report)?;
            if let Some(path) = runner.config().geojson.as_ref() {
                geojson::write(path, &analysis.tracks, &analysis.report)?;
            }
            if let Some(path) = runner.config().kml.as_ref() {
                kml::write(path, &analysis.tracks, &analysis.report)?;
            }
            if let Some(path) = runner.config().plot.as_ref() {
                plot::write(path, &analysis.tracks, &analysis.report)?;
            }

            let summary = &analysis.report.summary;
            let counts: Vec<String> = summary
                .counts
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect();
            println!(
                "[detect] reports {}, tracks {}, incidents {} ({})",
                summary.total_reports,
                summary.total_tracks,
                summary.total_incidents,
                counts.join(", ")
            );
        }
        Command::Parse { input, out } => {
            let scan = nmea::scan_file(&input)?;
            println!(
                "[parse] lines: {}, valid checksum: {} ({:.1}%)",
                scan.total(),
                scan.valid(),
                scan.valid_ratio() * 100.0
            );
            if let Some(path) = out {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                nmea::export_csv(&scan, &path)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_ml_flags(extra: &[&str]) -> Option<bool> {
        let mut argv = vec!["analyzer", "detect", "--in", "a.csv", "--report", "r.json"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Detect { ml, no_ml, .. } => ml_override(ml, no_ml),
            Command::Parse { .. } => panic!("parsed as parse command"),
        }
    }

    #[test]
    fn ml_flags_map_to_override() {
        assert_eq!(detect_ml_flags(&[]), None);
        assert_eq!(detect_ml_flags(&["--ml"]), Some(true));
        assert_eq!(detect_ml_flags(&["--no-ml"]), Some(false));
    }

    #[test]
    fn ml_and_no_ml_conflict() {
        let argv = [
            "analyzer", "detect", "--in", "a.csv", "--report", "r.json", "--ml", "--no-ml",
        ];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn plot_flag_is_accepted() {
        let argv = [
            "analyzer", "detect", "--in", "a.csv", "--report", "r.json", "--plot", "out/map.png",
        ];
        match Args::try_parse_from(argv).unwrap().command {
            Command::Detect { plot, .. } => assert_eq!(plot, Some(PathBuf::from("out/map.png"))),
            Command::Parse { .. } => panic!("parsed as parse command"),
        }
    }
}
