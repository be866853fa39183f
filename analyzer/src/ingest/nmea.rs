use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const AIS_PREFIXES: [&str; 3] = ["!AI", "!BS", "!AB"];

/// Framing fields of one AIS NMEA sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NmeaSentence {
    pub raw: String,
    pub valid_checksum: bool,
    pub talker: String,
    pub sentence: String,
    pub channel: Option<String>,
    pub frag_count: Option<u32>,
    pub frag_num: Option<u32>,
    pub payload_len: usize,
    pub fill_bits: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NmeaScan {
    pub sentences: Vec<NmeaSentence>,
}

impl NmeaScan {
    pub fn total(&self) -> usize {
        self.sentences.len()
    }

    pub fn valid(&self) -> usize {
        self.sentences.iter().filter(|s| s.valid_checksum).count()
    }

    pub fn valid_ratio(&self) -> f64 {
        if self.sentences.is_empty() {
            0.0
        } else {
            self.valid() as f64 / self.total() as f64
        }
    }
}

/// XOR of the bytes between the start delimiter and `*`, against the two hex digits after it.
pub fn checksum_valid(line: &str) -> bool {
    let Some((body, checksum)) = line.trim().split_once('*') else {
        return false;
    };
    let body = body
        .strip_prefix('!')
        .or_else(|| body.strip_prefix('$'))
        .unwrap_or(body);
    let Some(expected) = checksum.get(..2).and_then(|hex| u8::from_str_radix(hex, 16).ok()) else {
        return false;
    };
    body.bytes().fold(0u8, |acc, byte| acc ^ byte) == expected
}

/// Splits `!AIVDM,2,1,3,A,<payload>,0*hh` into its framing fields.
pub fn parse_sentence(line: &str) -> NmeaSentence {
    let line = line.trim();
    let without_checksum = line.split('*').next().unwrap_or_default();
    let parts: Vec<&str> = without_checksum.split(',').collect();
    let head = parts.first().copied().unwrap_or_default();
    let number = |idx: usize| parts.get(idx).and_then(|field| field.parse::<u32>().ok());

    NmeaSentence {
        raw: line.to_string(),
        valid_checksum: checksum_valid(line),
        talker: head.get(1..3).unwrap_or_default().to_string(),
        sentence: head.get(3..).unwrap_or_default().to_string(),
        frag_count: number(1),
        frag_num: number(2),
        channel: parts
            .get(4)
            .filter(|field| !field.is_empty())
            .map(|field| field.to_string()),
        payload_len: parts.get(5).map(|payload| payload.len()).unwrap_or(0),
        fill_bits: number(6),
    }
}

/// Keeps only AIS-looking lines; blank and foreign lines are skipped.
/// Bytes that are not UTF-8 are replaced, so a corrupted sentence still
/// counts and fails its checksum.
pub fn scan<R: BufRead>(mut reader: R) -> anyhow::Result<NmeaScan> {
    let mut scan = NmeaScan::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context("reading NMEA line")?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if !AIS_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            continue;
        }
        scan.sentences.push(parse_sentence(line));
    }
    Ok(scan)
}

pub fn scan_file<P: AsRef<Path>>(path: P) -> anyhow::Result<NmeaScan> {
    let path_ref = path.as_ref();
    let file =
        File::open(path_ref).with_context(|| format!("opening NMEA log {}", path_ref.display()))?;
    scan(BufReader::new(file)).with_context(|| format!("scanning {}", path_ref.display()))
}

pub fn export_csv<P: AsRef<Path>>(scan: &NmeaScan, path: P) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    let mut writer = ::csv::Writer::from_path(path_ref)
        .with_context(|| format!("creating {}", path_ref.display()))?;
    for sentence in &scan.sentences {
        writer
            .serialize(sentence)
            .with_context(|| format!("writing {}", path_ref.display()))?;
    }
    writer.flush()?;
    Ok(())
}
