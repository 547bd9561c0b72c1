//! Table formatting for CLI list commands
//!
//! Every list command builds [`TableRow`]s of typed [`CellValue`]s and hands
//! them to a [`TableFormatter`], which renders them in the requested
//! [`OutputFormat`]. Widths are measured in terminal columns so Hangul part
//! names line up.

use console::{measure_text_width, pad_str, style, Alignment};
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Part number (cyan in terminal output)
    Key(String),
    /// Plain text
    Text(String),
    /// Whole number
    Number(u64),
    /// Float with display precision
    Float(f64, usize),
    /// Float where 0 means "not measured" (shown as "-")
    Sample(f64, usize),
    /// Missing value
    Empty,
}

impl CellValue {
    /// Plain string value (used for CSV, TSV and Markdown)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Key(s) | CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = *precision),
            CellValue::Sample(f, precision) => {
                if *f > 0.0 {
                    format!("{:.prec$}", f, prec = *precision)
                } else {
                    String::new()
                }
            }
            CellValue::Empty => String::new(),
        }
    }

    /// Terminal rendering, padded or truncated to `width` columns
    pub fn format_cell(&self, width: usize) -> String {
        let raw = match self {
            CellValue::Sample(f, _) if *f <= 0.0 => "-".to_string(),
            CellValue::Empty => "-".to_string(),
            _ => self.raw(),
        };
        let text = if measure_text_width(&raw) > width {
            truncate_str(&raw, width)
        } else {
            raw
        };
        match self {
            CellValue::Key(_) => pad_str(&style(&text).cyan().to_string(), width, Alignment::Left, None)
                .into_owned(),
            CellValue::Number(_) | CellValue::Float(..) | CellValue::Sample(..) => {
                pad_str(&text, width, Alignment::Right, None).into_owned()
            }
            _ => pad_str(&text, width, Alignment::Left, None).into_owned(),
        }
    }

    pub fn format_md(&self) -> String {
        match self {
            CellValue::Empty => "-".to_string(),
            _ => self.raw().replace('|', "\\|"),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Key(s) | CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Number(n) => Value::from(*n),
            CellValue::Float(f, _) | CellValue::Sample(f, _) => Value::from(*f),
            CellValue::Empty => Value::Null,
        }
    }

    /// Display width of the content in terminal columns
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            CellValue::Sample(f, _) if *f <= 0.0 => 1,
            _ => measure_text_width(&self.raw()),
        }
    }
}

/// Column definition with key, header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that renders rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Suppress the "N item(s) found" line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Render rows in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Auto | OutputFormat::Table => self.render_table(rows),
            OutputFormat::Tsv => self.render_tsv(rows),
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Json => self.render_json(rows),
            OutputFormat::Id => self.render_ids(rows),
        }
    }

    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    fn cell_or_empty<'r>(row: &'r TableRow, key: &str) -> &'r CellValue {
        row.get(key).unwrap_or(&CellValue::Empty)
    }

    /// Column widths from content, capped at each column's maximum
    fn widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let content = rows
                    .iter()
                    .map(|r| Self::cell_or_empty(r, col.key).display_width())
                    .max()
                    .unwrap_or(0);
                measure_text_width(col.header).max(content).min(col.width)
            })
            .collect()
    }

    fn render_table(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));

        let widths = self.widths(rows);
        for row in rows {
            builder.push_record(self.columns.iter().zip(&widths).map(|(col, &w)| {
                let raw = match Self::cell_or_empty(row, col.key) {
                    CellValue::Empty => "-".to_string(),
                    CellValue::Sample(f, _) if *f <= 0.0 => "-".to_string(),
                    value => value.raw(),
                };
                truncate_str(&raw, w)
            }));
        }

        let mut out = builder.build().with(Style::rounded()).to_string();
        out.push('\n');
        self.push_summary(&mut out, rows.len());
        out
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.widths(rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| pad_str(&style(c.header).bold().to_string(), w, Alignment::Left, None).into_owned())
            .collect();
        out.push_str(header.join("\t").trim_end());
        out.push('\n');

        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(c, &w)| Self::cell_or_empty(row, c.key).format_cell(w))
                .collect();
            out.push_str(cells.join("\t").trim_end());
            out.push('\n');
        }

        self.push_summary(&mut out, rows.len());
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let keys: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        out.push_str(&keys.join(","));
        out.push('\n');

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|c| escape_csv(&Self::cell_or_empty(row, c.key).raw()))
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        out.push_str(&format!("| {} |\n", headers.join(" | ")));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|c| Self::cell_or_empty(row, c.key).format_md())
                .collect();
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
        out
    }

    fn render_json(&self, rows: &[TableRow]) -> String {
        let items: Vec<Value> = rows
            .iter()
            .map(|row| {
                let mut map = Map::new();
                for col in self.columns {
                    map.insert(col.key.to_string(), Self::cell_or_empty(row, col.key).to_json());
                }
                Value::Object(map)
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&Value::Array(items)).unwrap_or_else(|_| "[]".to_string());
        out.push('\n');
        out
    }

    fn render_ids(&self, rows: &[TableRow]) -> String {
        let Some(first) = self.columns.first() else {
            return String::new();
        };
        rows.iter()
            .map(|r| format!("{}\n", Self::cell_or_empty(r, first.key).raw()))
            .collect()
    }

    fn push_summary(&self, out: &mut String, count: usize) {
        if self.show_summary {
            out.push_str(&format!(
                "\n{} {}(s) found.\n",
                style(count).cyan(),
                self.entity_name
            ));
        }
    }
}
