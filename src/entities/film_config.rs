//! Film parameters per part number

use csv::StringRecord;
use serde::Serialize;

use crate::core::table::{FieldError, HeaderMap, KeyedTable, TableRecord};
use crate::entities::fields::{
    ValidationError, CORE_DIAMETER, FILM_THICKNESS, LABELS_PER_SET, MARK_SET_LENGTH,
};

/// Placeholder values offered when a part number has no saved parameters yet
pub const DEFAULT_THICKNESS_MM: f64 = 0.135;
pub const DEFAULT_CORE_DIAMETER_CM: f64 = 9.0;
pub const DEFAULT_MARK_SET_LENGTH_CM: f64 = 11.45;
pub const DEFAULT_LABELS_PER_SET: u32 = 5;

/// Saved film parameters for one part number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmConfig {
    pub part_number: String,

    /// Catalog name copied at save time
    pub part_name: String,

    pub film_thickness_mm: f64,

    pub core_outer_diameter_cm: f64,

    pub eye_mark_set_length_cm: f64,

    pub labels_per_set: u32,
}

impl FilmConfig {
    /// A new record for `part_number` filled with the placeholder defaults
    pub fn with_defaults(part_number: impl Into<String>, part_name: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            part_name: part_name.into(),
            film_thickness_mm: DEFAULT_THICKNESS_MM,
            core_outer_diameter_cm: DEFAULT_CORE_DIAMETER_CM,
            eye_mark_set_length_cm: DEFAULT_MARK_SET_LENGTH_CM,
            labels_per_set: DEFAULT_LABELS_PER_SET,
        }
    }

    /// Check every field against its entry minimum
    pub fn validate(&self) -> Result<(), ValidationError> {
        FILM_THICKNESS.check(self.film_thickness_mm)?;
        CORE_DIAMETER.check(self.core_outer_diameter_cm)?;
        MARK_SET_LENGTH.check(self.eye_mark_set_length_cm)?;
        LABELS_PER_SET.check(f64::from(self.labels_per_set))?;
        Ok(())
    }
}

/// Parse a labels-per-set value, accepting `5` and `5.0`
pub fn parse_labels_per_set(raw: &str) -> Result<u32, ValidationError> {
    let value = LABELS_PER_SET.parse(raw)?;
    whole_labels(value)
}

fn whole_labels(value: f64) -> Result<u32, ValidationError> {
    if value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ValidationError::NotWhole {
            field: LABELS_PER_SET.name.to_string(),
            value,
        });
    }
    Ok(value as u32)
}

impl TableRecord for FilmConfig {
    const HEADERS: &'static [&'static str] = &[
        "part_number",
        "part_name",
        "film_thickness_mm",
        "core_outer_diameter_cm",
        "eye_mark_set_length_cm",
        "labels_per_set",
    ];

    fn part_number(&self) -> &str {
        &self.part_number
    }

    fn to_cells(&self) -> Vec<String> {
        vec![
            self.part_number.clone(),
            self.part_name.clone(),
            self.film_thickness_mm.to_string(),
            self.core_outer_diameter_cm.to_string(),
            self.eye_mark_set_length_cm.to_string(),
            self.labels_per_set.to_string(),
        ]
    }

    fn from_cells(record: &StringRecord, headers: &HeaderMap) -> Result<Self, FieldError> {
        let labels = headers.number(record, "labels_per_set")?;
        let labels_per_set = whole_labels(labels).map_err(|_| {
            FieldError::invalid("labels_per_set", headers.get(record, "labels_per_set").unwrap_or_default())
        })?;

        Ok(Self {
            part_number: headers.text(record, "part_number"),
            part_name: headers.text(record, "part_name"),
            film_thickness_mm: headers.number(record, "film_thickness_mm")?,
            core_outer_diameter_cm: headers.number(record, "core_outer_diameter_cm")?,
            eye_mark_set_length_cm: headers.number(record, "eye_mark_set_length_cm")?,
            labels_per_set,
        })
    }
}

/// The film_config table
pub type FilmConfigTable = KeyedTable<FilmConfig>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Upsert;
    use tempfile::tempdir;

    fn sample(pn: &str, thickness: f64) -> FilmConfig {
        FilmConfig {
            film_thickness_mm: thickness,
            ..FilmConfig::with_defaults(pn, "Clear Film")
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = FilmConfig::with_defaults("P-1", "Film");
        assert_eq!(cfg.film_thickness_mm, 0.135);
        assert_eq!(cfg.core_outer_diameter_cm, 9.0);
        assert_eq!(cfg.eye_mark_set_length_cm, 11.45);
        assert_eq!(cfg.labels_per_set, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_thickness() {
        let cfg = sample("P-1", 0.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_upsert_twice_keeps_one_row_with_latest_values() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("film_config.csv");

        let mut table = FilmConfigTable::new();
        assert_eq!(table.upsert(sample("P-1", 0.135)), Upsert::Inserted);
        table.save(&path).unwrap();

        let mut table = FilmConfigTable::load(&path).unwrap();
        assert_eq!(table.upsert(sample("P-1", 0.150)), Upsert::Replaced);
        table.save(&path).unwrap();

        let table = FilmConfigTable::load(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("P-1").unwrap().film_thickness_mm, 0.150);
    }

    #[test]
    fn test_upsert_preserves_row_position() {
        let mut table = FilmConfigTable::from_rows([sample("A", 0.1), sample("B", 0.2), sample("C", 0.3)]);
        table.upsert(sample("B", 0.25));

        let order: Vec<&str> = table.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(table.rows()[1].film_thickness_mm, 0.25);
    }

    #[test]
    fn test_file_layout() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("film_config.csv");
        FilmConfigTable::from_rows([FilmConfig::with_defaults("P-1", "필름")])
            .save(&path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next().unwrap(),
            "part_number,part_name,film_thickness_mm,core_outer_diameter_cm,eye_mark_set_length_cm,labels_per_set"
        );
        assert_eq!(lines.next().unwrap(), "P-1,필름,0.135,9,11.45,5");
    }

    #[test]
    fn test_reads_float_labels_per_set() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("film_config.csv");
        std::fs::write(
            &path,
            "part_number,part_name,film_thickness_mm,core_outer_diameter_cm,eye_mark_set_length_cm,labels_per_set\n\
             P-1,Film,0.135,9.0,11.45,5.0\n",
        )
        .unwrap();

        let table = FilmConfigTable::load(&path).unwrap();
        assert_eq!(table.get("P-1").unwrap().labels_per_set, 5);
    }

    #[test]
    fn test_parse_labels_per_set() {
        assert_eq!(parse_labels_per_set("4"), Ok(4));
        assert!(parse_labels_per_set("0").is_err());
        assert!(parse_labels_per_set("2.5").is_err());
    }
}
