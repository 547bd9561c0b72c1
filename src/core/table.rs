//! Keyed CSV tables with upsert semantics
//!
//! Both persisted tables (film parameters and thickness measurements) share
//! the same shape: one row per part number, rows kept in insertion order,
//! whole-file rewrite on save. Files are written UTF-8 with a leading
//! byte-order mark so spreadsheet tools pick the right encoding.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use miette::Diagnostic;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Key column shared by every persisted table
pub const KEY_COLUMN: &str = "part_number";

/// A row type that can live in a [`KeyedTable`]
pub trait TableRecord: Clone {
    /// Canonical column order used when writing
    const HEADERS: &'static [&'static str];

    /// Unique key of the row
    fn part_number(&self) -> &str;

    /// Cells in `HEADERS` order
    fn to_cells(&self) -> Vec<String>;

    /// Build a row from a CSV record using a header-name → index map
    fn from_cells(record: &StringRecord, headers: &HeaderMap) -> Result<Self, FieldError>;
}

/// Whether an upsert added a new row or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Rows in display order plus a key index for O(1) upsert
#[derive(Debug, Clone)]
pub struct KeyedTable<R> {
    rows: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R> Default for KeyedTable<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: TableRecord> KeyedTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows; a repeated key replaces the earlier row in place
    pub fn from_rows(rows: impl IntoIterator<Item = R>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.upsert(row);
        }
        table
    }

    /// Replace the row with the same part number, or append a new one
    pub fn upsert(&mut self, row: R) -> Upsert {
        let key = row.part_number().trim().to_string();
        match self.index.get(&key) {
            Some(&idx) => {
                self.rows[idx] = row;
                Upsert::Replaced
            }
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(row);
                Upsert::Inserted
            }
        }
    }

    pub fn get(&self, part_number: &str) -> Option<&R> {
        self.index
            .get(part_number.trim())
            .map(|&idx| &self.rows[idx])
    }

    pub fn contains(&self, part_number: &str) -> bool {
        self.index.contains_key(part_number.trim())
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Load a table from disk. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "table file not found, starting empty");
            return Ok(Self::new());
        }

        let bytes = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(strip_bom(&bytes)).map_err(|e| e.with_path(path))?;
        tracing::debug!(path = %path.display(), rows = table.len(), "loaded table");
        Ok(table)
    }

    fn parse(bytes: &[u8]) -> Result<Self, StoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader.headers().map_err(StoreError::csv)?.clone();
        let header_map = HeaderMap::new(&headers);

        let mut table = Self::new();
        for (i, result) in reader.records().enumerate() {
            let record = result.map_err(StoreError::csv)?;
            if record.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            // Header is line 1
            let line = record.position().map_or(i as u64 + 2, |p| p.line());
            if header_map.get(&record, KEY_COLUMN).is_none() {
                tracing::warn!(line, "skipping stored row without a part number");
                continue;
            }
            let row = R::from_cells(&record, &header_map).map_err(|e| e.at_line(line))?;
            if table.upsert(row) == Upsert::Replaced {
                tracing::warn!(line, "duplicate part number in stored table, later row wins");
            }
        }
        Ok(table)
    }

    /// Serialize the table as CSV (no byte-order mark)
    pub fn to_csv(&self) -> Result<Vec<u8>, StoreError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(R::HEADERS).map_err(StoreError::csv)?;
        for row in &self.rows {
            writer.write_record(row.to_cells()).map_err(StoreError::csv)?;
        }
        writer
            .into_inner()
            .map_err(|e| StoreError::csv(csv::Error::from(e.into_error())))
    }

    /// Persist the whole table.
    ///
    /// Content goes to a sibling temp file that is then renamed over the
    /// target, so readers see either the old or the new file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let mut content = UTF8_BOM.to_vec();
        content.extend(self.to_csv().map_err(|e| e.with_path(path))?);

        let tmp = temp_path(path);
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&tmp, content).map_err(write_err)?;
        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }

        tracing::info!(path = %path.display(), rows = self.len(), "saved table");
        Ok(())
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table.csv".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Map from lowercase header name to column index
#[derive(Debug, Clone, Default)]
pub struct HeaderMap(HashMap<String, usize>);

impl HeaderMap {
    pub fn new(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    /// Trimmed, non-empty field value
    pub fn get<'r>(&self, record: &'r StringRecord, field: &str) -> Option<&'r str> {
        self.0
            .get(field)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn text(&self, record: &StringRecord, field: &str) -> String {
        self.get(record, field).unwrap_or_default().to_string()
    }

    /// Parse a required number
    pub fn number(&self, record: &StringRecord, field: &str) -> Result<f64, FieldError> {
        self.optional_number(record, field)?
            .ok_or_else(|| FieldError::missing(field))
    }

    /// Parse a number; blank or absent cells are `None`
    pub fn optional_number(
        &self,
        record: &StringRecord,
        field: &str,
    ) -> Result<Option<f64>, FieldError> {
        match self.get(record, field) {
            None => Ok(None),
            Some(raw) if raw.eq_ignore_ascii_case("nan") => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| FieldError::invalid(field, raw)),
        }
    }
}

/// A single bad cell, before the file and line are known
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub column: String,
    pub value: Option<String>,
}

impl FieldError {
    pub fn missing(column: &str) -> Self {
        Self {
            column: column.to_string(),
            value: None,
        }
    }

    pub fn invalid(column: &str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            value: Some(value.to_string()),
        }
    }

    fn at_line(self, line: u64) -> StoreError {
        StoreError::InvalidValue {
            path: PathBuf::new(),
            line,
            column: self.column,
            value: self.value.unwrap_or_else(|| "(blank)".to_string()),
        }
    }
}

/// Errors raised while loading or saving a persisted table
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(filmtk::store::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    #[diagnostic(
        code(filmtk::store::write),
        help("the previously saved file was left untouched")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}", .path.display())]
    #[diagnostic(code(filmtk::store::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: line {line}: column '{column}' has invalid value '{value}'", .path.display())]
    #[diagnostic(
        code(filmtk::store::invalid_value),
        help("fix the cell in a spreadsheet editor or remove the row")
    )]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
}

impl StoreError {
    fn csv(source: csv::Error) -> Self {
        StoreError::Csv {
            path: PathBuf::new(),
            source,
        }
    }

    fn with_path(mut self, file: &Path) -> Self {
        match &mut self {
            StoreError::Read { path, .. }
            | StoreError::Write { path, .. }
            | StoreError::Csv { path, .. }
            | StoreError::InvalidValue { path, .. } => *path = file.to_path_buf(),
        }
        self
    }
}
