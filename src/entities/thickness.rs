//! Thickness measurements per part number
//!
//! Each part number carries nine thickness samples. A sample of 0 means
//! "not measured yet" and is left out of the statistics. Mean and sample
//! standard deviation are derived values: they are recomputed from the
//! samples whenever a record is built, loaded or saved.

use csv::StringRecord;
use serde::Serialize;

use crate::core::table::{FieldError, HeaderMap, KeyedTable, TableRecord, Upsert};
use crate::entities::fields::{ValidationError, MEASUREMENT};

/// Number of thickness samples per part number
pub const MEASUREMENT_COUNT: usize = 9;

pub type Measurements = [f64; MEASUREMENT_COUNT];

const MEASUREMENT_COLUMNS: [&str; MEASUREMENT_COUNT] = [
    "measurement_1",
    "measurement_2",
    "measurement_3",
    "measurement_4",
    "measurement_5",
    "measurement_6",
    "measurement_7",
    "measurement_8",
    "measurement_9",
];

/// Mean and sample standard deviation of the measured (> 0) values.
///
/// Returns `(0.0, 0.0)` when nothing is measured; stdev is 0.0 for a single
/// sample and uses the n-1 denominator otherwise.
pub fn compute_stats(measurements: &[f64]) -> (f64, f64) {
    let valid: Vec<f64> = measurements.iter().copied().filter(|&v| v > 0.0).collect();
    let n = valid.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let mean = valid.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }

    let sum_sq: f64 = valid.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (sum_sq / (n - 1) as f64).sqrt())
}

/// Saved thickness samples for one part number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThicknessRecord {
    pub part_number: String,
    pub part_name: String,
    pub vendor: String,
    pub measurements: Measurements,
    pub mean: f64,
    pub stdev: f64,
}

impl ThicknessRecord {
    pub fn new(
        part_number: impl Into<String>,
        part_name: impl Into<String>,
        vendor: impl Into<String>,
        measurements: Measurements,
    ) -> Self {
        let (mean, stdev) = compute_stats(&measurements);
        Self {
            part_number: part_number.into(),
            part_name: part_name.into(),
            vendor: vendor.into(),
            measurements,
            mean,
            stdev,
        }
    }

    /// Number of samples counted in the statistics
    pub fn measured_count(&self) -> usize {
        self.measurements.iter().filter(|&&v| v > 0.0).count()
    }
}

impl TableRecord for ThicknessRecord {
    const HEADERS: &'static [&'static str] = &[
        "part_number",
        "part_name",
        "vendor",
        "measurement_1",
        "measurement_2",
        "measurement_3",
        "measurement_4",
        "measurement_5",
        "measurement_6",
        "measurement_7",
        "measurement_8",
        "measurement_9",
        "mean",
        "stdev",
    ];

    fn part_number(&self) -> &str {
        &self.part_number
    }

    fn to_cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.part_number.clone(),
            self.part_name.clone(),
            self.vendor.clone(),
        ];
        cells.extend(self.measurements.iter().map(f64::to_string));
        cells.push(self.mean.to_string());
        cells.push(self.stdev.to_string());
        cells
    }

    fn from_cells(record: &StringRecord, headers: &HeaderMap) -> Result<Self, FieldError> {
        let mut measurements = [0.0; MEASUREMENT_COUNT];
        for (slot, column) in measurements.iter_mut().zip(MEASUREMENT_COLUMNS) {
            // Blank cells are unmeasured samples
            *slot = headers.optional_number(record, column)?.unwrap_or(0.0);
        }

        // Stored mean/stdev are ignored; they are derived from the samples
        Ok(Self::new(
            headers.text(record, "part_number"),
            headers.text(record, "part_name"),
            headers.text(record, "vendor"),
            measurements,
        ))
    }
}

/// The film_thickness table
pub type ThicknessTable = KeyedTable<ThicknessRecord>;

/// New measurements for a part number, as entered by the user
#[derive(Debug, Clone)]
pub struct ThicknessEntry {
    pub part_number: String,
    pub part_name: String,
    /// Blank or `None` keeps the vendor already on file
    pub vendor: Option<String>,
    pub measurements: Measurements,
}

impl KeyedTable<ThicknessRecord> {
    /// Stored samples for a part number, or all zeros
    pub fn measurements_for(&self, part_number: &str) -> Measurements {
        self.get(part_number)
            .map(|r| r.measurements)
            .unwrap_or([0.0; MEASUREMENT_COUNT])
    }

    /// Recompute statistics and upsert the record.
    ///
    /// A blank vendor falls back to the previously stored vendor for the
    /// part number instead of erasing it.
    pub fn record_measurements(&mut self, entry: ThicknessEntry) -> (ThicknessRecord, Upsert) {
        let vendor = entry
            .vendor
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| self.get(&entry.part_number).map(|r| r.vendor.clone()))
            .unwrap_or_default();

        let record = ThicknessRecord::new(
            entry.part_number,
            entry.part_name,
            vendor,
            entry.measurements,
        );
        let outcome = self.upsert(record.clone());
        (record, outcome)
    }
}

/// Overwrite samples 1..=n with `values`
pub fn overwrite_leading(
    measurements: &mut Measurements,
    values: &[f64],
) -> Result<(), ValidationError> {
    if values.len() > MEASUREMENT_COUNT {
        return Err(ValidationError::TooMany {
            got: values.len(),
            max: MEASUREMENT_COUNT,
        });
    }
    for (slot, &value) in measurements.iter_mut().zip(values) {
        *slot = MEASUREMENT.check(value)?;
    }
    Ok(())
}

/// Set one sample by its 1-based position
pub fn set_measurement(
    measurements: &mut Measurements,
    position: usize,
    value: f64,
) -> Result<(), ValidationError> {
    if position == 0 || position > MEASUREMENT_COUNT {
        return Err(ValidationError::Position {
            position,
            max: MEASUREMENT_COUNT,
        });
    }
    measurements[position - 1] = MEASUREMENT.check(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_stats_three_samples() {
        let (mean, stdev) = compute_stats(&[0.14, 0.135, 0.133, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(close(mean, 0.136));
        assert!(close(stdev, 0.0036055512754639926));
    }

    #[test]
    fn test_stats_all_zero() {
        assert_eq!(compute_stats(&[0.0; 9]), (0.0, 0.0));
    }

    #[test]
    fn test_stats_single_sample() {
        let (mean, stdev) = compute_stats(&[0.14, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(close(mean, 0.14));
        assert_eq!(stdev, 0.0);
    }

    #[test]
    fn test_stats_uses_sample_denominator() {
        let (mean, stdev) = compute_stats(&[0.1, 0.2]);
        assert!(close(mean, 0.15));
        assert!(close(stdev, 0.07071067811865475));
    }

    #[test]
    fn test_vendor_falls_back_to_stored() {
        let mut table = ThicknessTable::new();
        let mut samples = [0.0; MEASUREMENT_COUNT];
        samples[0] = 0.14;
        table.record_measurements(ThicknessEntry {
            part_number: "P-1".to_string(),
            part_name: "Film".to_string(),
            vendor: Some("IJ Pack".to_string()),
            measurements: samples,
        });

        samples[1] = 0.135;
        let (record, outcome) = table.record_measurements(ThicknessEntry {
            part_number: "P-1".to_string(),
            part_name: "Film".to_string(),
            vendor: Some("   ".to_string()),
            measurements: samples,
        });

        assert_eq!(outcome, Upsert::Replaced);
        assert_eq!(record.vendor, "IJ Pack");
        assert_eq!(record.measured_count(), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_vendor_can_be_replaced() {
        let mut table = ThicknessTable::new();
        for vendor in ["A", "B"] {
            table.record_measurements(ThicknessEntry {
                part_number: "P-1".to_string(),
                part_name: "Film".to_string(),
                vendor: Some(vendor.to_string()),
                measurements: [0.0; MEASUREMENT_COUNT],
            });
        }
        assert_eq!(table.get("P-1").unwrap().vendor, "B");
    }

    #[test]
    fn test_blank_cells_load_as_zero_and_stats_recomputed() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("film_thickness.csv");
        std::fs::write(
            &path,
            "\u{feff}part_number,part_name,vendor,measurement_1,measurement_2,measurement_3,\
             measurement_4,measurement_5,measurement_6,measurement_7,measurement_8,measurement_9,mean,stdev\n\
             P-1,Film,V,0.14,0.135,0.133,,,,,,,999,999\n",
        )
        .unwrap();

        let table = ThicknessTable::load(&path).unwrap();
        let record = table.get("P-1").unwrap();
        assert_eq!(record.measurements[3], 0.0);
        assert!(close(record.mean, 0.136));
        assert!(close(record.stdev, 0.0036055512754639926));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("film_thickness.csv");
        let mut samples = [0.0; MEASUREMENT_COUNT];
        samples[..3].copy_from_slice(&[0.14, 0.135, 0.133]);

        let table = ThicknessTable::from_rows([ThicknessRecord::new("P-1", "Film", "V", samples)]);
        table.save(&path).unwrap();

        let loaded = ThicknessTable::load(&path).unwrap();
        assert_eq!(loaded.rows(), table.rows());
        assert_eq!(loaded.measurements_for("P-1"), samples);
        assert_eq!(loaded.measurements_for("P-9"), [0.0; MEASUREMENT_COUNT]);
    }

    #[test]
    fn test_overwrite_leading_and_set() {
        let mut samples = [0.5; MEASUREMENT_COUNT];
        overwrite_leading(&mut samples, &[0.1, 0.2]).unwrap();
        assert_eq!(&samples[..3], &[0.1, 0.2, 0.5]);

        set_measurement(&mut samples, 9, 0.3).unwrap();
        assert_eq!(samples[8], 0.3);

        assert!(set_measurement(&mut samples, 0, 0.3).is_err());
        assert!(set_measurement(&mut samples, 10, 0.3).is_err());
        assert!(set_measurement(&mut samples, 1, -0.1).is_err());
        assert!(overwrite_leading(&mut samples, &[0.1; 10]).is_err());
    }
}
