//! Delimited text tables with pipe/comma sniffing.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::StoreError;

const BOM: char = '\u{feff}';

/// Field delimiter of a tabular input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Pipe,
}

impl Delimiter {
    /// Pipe when the first line has more `|` than `,`; comma otherwise.
    pub fn detect(content: &str) -> Self {
        let first_line = content.lines().next().unwrap_or("");
        let pipes = first_line.matches('|').count();
        let commas = first_line.matches(',').count();
        if pipes > commas { Self::Pipe } else { Self::Comma }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Pipe => b'|',
        }
    }
}

/// A parsed table: header names plus typed rows.
#[derive(Debug, Clone)]
pub struct Table<T> {
    pub delimiter: Delimiter,
    pub headers: Vec<String>,
    pub rows: Vec<T>,
}

impl<T> Table<T> {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// Read a file as UTF-8, dropping a leading byte-order mark.
pub fn read_text(path: &Path) -> Result<String, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(match text.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Parse delimited `content` into rows of `T`, sniffing the delimiter.
///
/// Rows may be ragged; missing trailing cells and blank cells both
/// deserialize as `None` for optional fields.
pub fn parse_table<T: DeserializeOwned>(content: &str) -> Result<Table<T>, StoreError> {
    let delimiter = Delimiter::detect(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let rows = reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table {
        delimiter,
        headers,
        rows,
    })
}
