pub mod geojson;
pub mod json;
pub mod kml;
pub mod plot;

use anyhow::Context;
use std::fs;
use std::path::Path;

pub(crate) fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}

/// Writes `contents`, creating parent directories first.
pub(crate) fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    ensure_parent(path)?;
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
