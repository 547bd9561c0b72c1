//! Reference parts catalog (part number → part name)
//!
//! The catalog comes from an upstream BOM spreadsheet and is read-only here.
//! Loading never fails hard: a missing file, sheet or column produces a
//! diagnostic and an empty catalog, and commands that need a part number
//! stop with a message instead.
//!
//! Header labels are matched exactly, after numbering duplicates the way
//! spreadsheet tooling does (`품명`, `품명.1`, ...). The BOM has more than one
//! name-like column and only the configured label is the real part name.

use calamine::{open_workbook_auto, Data, Reader};
use miette::Diagnostic;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::{Config, Project};

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CatalogEntry {
    pub part_number: String,
    pub part_name: String,
}

/// Where and how to read the catalog
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub path: PathBuf,
    pub sheet: String,
    pub part_number_column: String,
    pub part_name_column: String,
}

impl CatalogSource {
    pub fn from_config(config: &Config, project: &Project) -> Self {
        Self {
            path: project.resolve_path(config.catalog_file()),
            sheet: config.catalog_sheet().to_string(),
            part_number_column: config.part_number_column().to_string(),
            part_name_column: config.part_name_column().to_string(),
        }
    }

    fn is_csv(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
    }
}

/// Deduplicated catalog in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw rows. Blank part numbers are dropped and the first
    /// occurrence of a repeated part number wins.
    pub fn from_entries(rows: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::empty();
        for row in rows {
            let part_number = row.part_number.trim().to_string();
            if part_number.is_empty() {
                continue;
            }
            if catalog.index.contains_key(&part_number) {
                tracing::debug!(part_number = %part_number, "duplicate catalog part number ignored");
                continue;
            }
            catalog.index.insert(part_number.clone(), catalog.entries.len());
            catalog.entries.push(CatalogEntry {
                part_number,
                part_name: row.part_name.trim().to_string(),
            });
        }
        catalog
    }

    /// Load the catalog, propagating the reason it could not be read
    pub fn try_load(source: &CatalogSource) -> Result<Self, CatalogError> {
        if !source.path.exists() {
            return Err(CatalogError::MissingSource {
                path: source.path.clone(),
            });
        }

        let grid = if source.is_csv() {
            read_csv_grid(&source.path)?
        } else {
            read_workbook_grid(&source.path, &source.sheet)?
        };

        Self::from_grid(source, grid)
    }

    fn from_grid(source: &CatalogSource, grid: Vec<Vec<String>>) -> Result<Self, CatalogError> {
        let mut rows = grid.into_iter();
        let headers = disambiguate_headers(&rows.next().unwrap_or_default());

        let position = |label: &str| headers.iter().position(|h| h == label);
        let (number_idx, name_idx) = match (
            position(&source.part_number_column),
            position(&source.part_name_column),
        ) {
            (Some(n), Some(m)) => (n, m),
            (n, m) => {
                let mut missing = Vec::new();
                if n.is_none() {
                    missing.push(source.part_number_column.clone());
                }
                if m.is_none() {
                    missing.push(source.part_name_column.clone());
                }
                return Err(CatalogError::MissingColumn {
                    path: source.path.clone(),
                    missing,
                    found: headers,
                });
            }
        };

        let cell = |row: &[String], idx: usize| row.get(idx).cloned().unwrap_or_default();
        let catalog = Self::from_entries(rows.map(|row| CatalogEntry {
            part_number: cell(&row, number_idx),
            part_name: cell(&row, name_idx),
        }));
        Ok(catalog)
    }

    pub fn get(&self, part_number: &str) -> Option<&CatalogEntry> {
        self.index
            .get(part_number.trim())
            .map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Part numbers in ascending order, for selection lists
    pub fn part_numbers_sorted(&self) -> Vec<&str> {
        let mut numbers: Vec<&str> = self.entries.iter().map(|e| e.part_number.as_str()).collect();
        numbers.sort_unstable();
        numbers
    }

    /// Entries sorted by part number whose number or name contains `needle`
    pub fn search(&self, needle: &str) -> Vec<&CatalogEntry> {
        let needle = needle.to_lowercase();
        let mut hits: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.part_number.to_lowercase().contains(&needle)
                    || e.part_name.to_lowercase().contains(&needle)
            })
            .collect();
        hits.sort_by(|a, b| a.part_number.cmp(&b.part_number));
        hits
    }
}

/// Load the catalog for a session. Failures are logged and returned next to
/// an empty catalog.
pub fn load_catalog(source: &CatalogSource) -> (Catalog, Option<CatalogError>) {
    match Catalog::try_load(source) {
        Ok(catalog) => {
            tracing::debug!(
                path = %source.path.display(),
                entries = catalog.len(),
                "loaded catalog"
            );
            (catalog, None)
        }
        Err(e) => {
            tracing::debug!(error = %e, "catalog unavailable");
            (Catalog::empty(), Some(e))
        }
    }
}

/// Number repeated headers: the second `X` becomes `X.1`, the third `X.2`.
///
/// A generated label that collides with an existing one is numbered again,
/// so `a, a.1, a` becomes `a, a.1, a.1.1`.
pub fn disambiguate_headers(raw: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());

    for header in raw {
        let mut label = header.trim().to_string();
        let mut count = counts.get(&label).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(label.clone(), count + 1);
            label = format!("{}.{}", label, count);
            count = counts.get(&label).copied().unwrap_or(0);
        }
        counts.insert(label.clone(), count + 1);
        out.push(label);
    }
    out
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<String>>, CatalogError> {
    let unreadable = |message: String| CatalogError::Unreadable {
        path: path.to_path_buf(),
        message,
    };
    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    reader
        .records()
        .map(|r| {
            r.map(|rec| rec.iter().map(|c| c.trim().to_string()).collect())
                .map_err(|e| unreadable(e.to_string()))
        })
        .collect()
}

fn read_workbook_grid(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>, CatalogError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| CatalogError::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheets = workbook.sheet_names();
    if !sheets.iter().any(|s| s == sheet) {
        return Err(CatalogError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available: sheets,
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| CatalogError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Render a workbook cell as text; whole floats lose their `.0`
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

/// Reasons the catalog could not be read
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("catalog file not found: {}", .path.display())]
    #[diagnostic(
        code(filmtk::catalog::missing_source),
        help("place the BOM next to the project or set `catalog_file` with `filmtk config set`")
    )]
    MissingSource { path: PathBuf },

    #[error("could not read catalog {}: {message}", .path.display())]
    #[diagnostic(code(filmtk::catalog::unreadable))]
    Unreadable { path: PathBuf, message: String },

    #[error("sheet '{sheet}' not found in {} (available: {})", .path.display(), .available.join(", "))]
    #[diagnostic(code(filmtk::catalog::missing_sheet), help("set `catalog_sheet` to one of the available sheets"))]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    #[error(
        "catalog {} is missing column(s): {} (found: {})",
        .path.display(),
        .missing.join(", "),
        .found.join(", ")
    )]
    #[diagnostic(
        code(filmtk::catalog::missing_column),
        help("header labels must match exactly; repeated headers are numbered X, X.1, X.2")
    )]
    MissingColumn {
        path: PathBuf,
        missing: Vec<String>,
        found: Vec<String>,
    },
}
