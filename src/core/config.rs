//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

pub const DEFAULT_CATALOG_FILE: &str = "BOM.xlsx";
pub const DEFAULT_CATALOG_SHEET: &str = "Sheet1";
pub const DEFAULT_PART_NUMBER_COLUMN: &str = "품번";
/// The BOM carries two "품명" headers; the part name lives in the second one.
pub const DEFAULT_PART_NAME_COLUMN: &str = "품명.1";
pub const DEFAULT_FILM_CONFIG_FILE: &str = "film_config.csv";
pub const DEFAULT_FILM_THICKNESS_FILE: &str = "film_thickness.csv";

/// filmtk configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reference catalog workbook or CSV
    pub catalog_file: Option<String>,

    /// Sheet to read from a workbook catalog
    pub catalog_sheet: Option<String>,

    /// Exact header label of the part-number column
    pub part_number_column: Option<String>,

    /// Exact header label of the part-name column
    pub part_name_column: Option<String>,

    /// Film parameter table
    pub film_config_file: Option<String>,

    /// Thickness measurement table
    pub film_thickness_file: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (resolved in the accessors)

        // 2. Global user config (~/.config/filmtk/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.filmtk/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.project_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(catalog) = std::env::var("FILMTK_CATALOG") {
            config.catalog_file = Some(catalog);
        }
        if let Ok(sheet) = std::env::var("FILMTK_SHEET") {
            config.catalog_sheet = Some(sheet);
        }

        config
    }

    /// Parse a YAML config file; unreadable or malformed files are skipped
    pub fn read_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        let has_content = contents
            .lines()
            .map(str::trim)
            .any(|l| !l.is_empty() && !l.starts_with('#'));
        if !has_content {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "filmtk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.catalog_file.is_some() {
            self.catalog_file = other.catalog_file;
        }
        if other.catalog_sheet.is_some() {
            self.catalog_sheet = other.catalog_sheet;
        }
        if other.part_number_column.is_some() {
            self.part_number_column = other.part_number_column;
        }
        if other.part_name_column.is_some() {
            self.part_name_column = other.part_name_column;
        }
        if other.film_config_file.is_some() {
            self.film_config_file = other.film_config_file;
        }
        if other.film_thickness_file.is_some() {
            self.film_thickness_file = other.film_thickness_file;
        }
    }

    pub fn catalog_file(&self) -> &str {
        self.catalog_file.as_deref().unwrap_or(DEFAULT_CATALOG_FILE)
    }

    pub fn catalog_sheet(&self) -> &str {
        self.catalog_sheet.as_deref().unwrap_or(DEFAULT_CATALOG_SHEET)
    }

    pub fn part_number_column(&self) -> &str {
        self.part_number_column
            .as_deref()
            .unwrap_or(DEFAULT_PART_NUMBER_COLUMN)
    }

    pub fn part_name_column(&self) -> &str {
        self.part_name_column
            .as_deref()
            .unwrap_or(DEFAULT_PART_NAME_COLUMN)
    }

    pub fn film_config_file(&self) -> &str {
        self.film_config_file
            .as_deref()
            .unwrap_or(DEFAULT_FILM_CONFIG_FILE)
    }

    pub fn film_thickness_file(&self) -> &str {
        self.film_thickness_file
            .as_deref()
            .unwrap_or(DEFAULT_FILM_THICKNESS_FILE)
    }

    /// Look up a value by its config key (as used in config.yaml)
    pub fn value(&self, key: &str) -> Option<&str> {
        match key {
            "catalog_file" => Some(self.catalog_file()),
            "catalog_sheet" => Some(self.catalog_sheet()),
            "part_number_column" => Some(self.part_number_column()),
            "part_name_column" => Some(self.part_name_column()),
            "film_config_file" => Some(self.film_config_file()),
            "film_thickness_file" => Some(self.film_thickness_file()),
            _ => None,
        }
    }
}

/// Valid configuration keys with descriptions
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    ("catalog_file", "Reference parts catalog (xlsx/xls/ods or csv)"),
    ("catalog_sheet", "Sheet name to read from a workbook catalog"),
    ("part_number_column", "Exact header label of the part-number column"),
    ("part_name_column", "Exact header label of the part-name column"),
    ("film_config_file", "CSV table of per-part film parameters"),
    ("film_thickness_file", "CSV table of per-part thickness measurements"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.catalog_file(), "BOM.xlsx");
        assert_eq!(config.catalog_sheet(), "Sheet1");
        assert_eq!(config.part_number_column(), "품번");
        assert_eq!(config.part_name_column(), "품명.1");
        assert_eq!(config.film_config_file(), "film_config.csv");
        assert_eq!(config.film_thickness_file(), "film_thickness.csv");
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            catalog_file: Some("a.xlsx".to_string()),
            catalog_sheet: Some("Parts".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            catalog_file: Some("b.csv".to_string()),
            ..Default::default()
        });

        assert_eq!(base.catalog_file(), "b.csv");
        assert_eq!(base.catalog_sheet(), "Parts");
    }

    #[test]
    fn test_read_file_with_only_comments() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "# nothing set\n").unwrap();

        let config = Config::read_file(&path).unwrap();
        assert!(config.catalog_file.is_none());
    }

    #[test]
    fn test_read_file_values() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "catalog_file: parts.csv\npart_name_column: name\n").unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.catalog_file(), "parts.csv");
        assert_eq!(config.part_name_column(), "name");
        assert_eq!(config.value("part_name_column"), Some("name"));
        assert_eq!(config.value("nope"), None);
    }
}
