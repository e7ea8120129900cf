//! Per-family JSON export handed to document renderers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use sspkit_core::family::family_for;
use tracing::info;

use crate::view::{ControlView, group_by_family};

#[derive(Serialize)]
struct FamilyExport<'a> {
    key: &'a str,
    family: &'a str,
    generated: &'a str,
    evidence_base_path: &'a str,
    controls: &'a [ControlView],
}

/// Write one `<KEY>_controls.json` per family. Returns the paths written.
pub fn write_family_exports(
    output_dir: &Path,
    views: Vec<ControlView>,
    generated: &str,
    evidence_base_path: &str,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for (key, controls) in group_by_family(views) {
        // Named after the group's first control, like the family heading.
        let family = controls.first().map_or(key, |c| family_for(&c.id));
        let doc = FamilyExport {
            key,
            family,
            generated,
            evidence_base_path,
            controls: &controls,
        };

        let path = output_dir.join(format!("{key}_controls.json"));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &doc)
            .with_context(|| format!("writing {}", path.display()))?;
        writer.flush()?;

        info!(path = %path.display(), controls = controls.len(), "generated export");
        written.push(path);
    }
    Ok(written)
}
