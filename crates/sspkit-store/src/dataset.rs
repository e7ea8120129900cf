//! Loaders for the two input datasets.

use std::path::Path;

use sspkit_core::{ControlRecord, EvidenceRecord};
use tracing::{debug, info, warn};

use crate::StoreError;
use crate::delimited::{Delimiter, Table, parse_table, read_text};

/// Header that every control dataset must carry.
pub const CONTROL_ID_COLUMN: &str = "CMMC_ID";

/// Columns the reconciler reads from the evidence dataset.
pub const EVIDENCE_COLUMNS: &[&str] = &[
    "File_Name",
    "Current_Sharepoint_Link",
    "Description",
    "Suggested_CMMC_Mappings",
    "Provided_CMMC_Mappings",
];

/// Load the primary control dataset.
///
/// Fails when the file is missing, unreadable, or lacks the `CMMC_ID` column.
pub fn load_controls(path: &Path) -> Result<Table<ControlRecord>, StoreError> {
    info!(path = %path.display(), "loading control dataset");
    let text = read_text(path)?;
    let table: Table<ControlRecord> = parse_table(&text)?;
    log_shape(&table);

    if !table.has_column(CONTROL_ID_COLUMN) {
        return Err(StoreError::MissingColumn(CONTROL_ID_COLUMN.to_string()));
    }

    info!(count = table.rows.len(), "loaded control rows");
    Ok(table)
}

/// Load the evidence-mapping dataset.
///
/// Returns `Ok(None)` when the file does not exist; the caller decides how
/// loudly to report that. Missing columns are tolerated.
pub fn load_evidence(path: &Path) -> Result<Option<Table<EvidenceRecord>>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    info!(path = %path.display(), "loading evidence enrichment");
    let text = read_text(path)?;
    let table: Table<EvidenceRecord> = parse_table(&text)?;
    log_shape(&table);

    for column in EVIDENCE_COLUMNS {
        if !table.has_column(column) {
            warn!(column, "evidence dataset has no such column");
        }
    }

    info!(count = table.rows.len(), "loaded evidence rows");
    Ok(Some(table))
}

fn log_shape<T>(table: &Table<T>) {
    match table.delimiter {
        Delimiter::Pipe => info!("detected pipe-delimited file"),
        Delimiter::Comma => info!("using comma delimiter"),
    }
    debug!(columns = ?table.headers, "columns found");
}
