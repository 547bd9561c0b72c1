//! Label yield per roll
//!
//! The wound film is treated as an annulus: its cross-section area divided
//! by the film thickness gives the unwound length. That length is cut into
//! whole eye-mark sets, each carrying a whole number of labels.

use std::f64::consts::PI;

use crate::entities::film_config::FilmConfig;

/// Whole labels on a roll of the given outer diameter.
///
/// Returns 0 for any non-positive or non-numeric input, when the roll is
/// not larger than its core, and when the arithmetic does not produce a
/// finite count.
pub fn labels_per_roll(
    thickness_mm: f64,
    roll_diameter_cm: f64,
    core_diameter_cm: f64,
    mark_set_length_cm: f64,
    labels_per_set: f64,
) -> u64 {
    let inputs = [
        thickness_mm,
        roll_diameter_cm,
        core_diameter_cm,
        mark_set_length_cm,
        labels_per_set,
    ];
    // `!(x > 0.0)` also rejects NaN
    if inputs.iter().any(|&x| !(x > 0.0) || x.is_infinite()) {
        return 0;
    }
    if roll_diameter_cm <= core_diameter_cm {
        return 0;
    }

    let roll_m = roll_diameter_cm / 100.0;
    let core_m = core_diameter_cm / 100.0;
    let thickness_m = thickness_mm / 1000.0;

    let film_length_m = PI * ((roll_m.powi(2) - core_m.powi(2)) / (4.0 * thickness_m));
    let sets = film_length_m / (mark_set_length_cm / 100.0);
    if !sets.is_finite() || sets < 0.0 || sets >= u64::MAX as f64 {
        return 0;
    }

    let whole_sets = sets.trunc() as u64;
    let whole_labels = labels_per_set.trunc() as u64;
    whole_sets.checked_mul(whole_labels).unwrap_or(0)
}

/// The roll-independent parameters of a yield calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollSpec {
    pub thickness_mm: f64,
    pub core_diameter_cm: f64,
    pub mark_set_length_cm: f64,
    pub labels_per_set: f64,
}

impl RollSpec {
    pub fn labels_for(&self, roll_diameter_cm: f64) -> u64 {
        labels_per_roll(
            self.thickness_mm,
            roll_diameter_cm,
            self.core_diameter_cm,
            self.mark_set_length_cm,
            self.labels_per_set,
        )
    }

    /// Evaluate a batch of roll diameters, keeping input order
    pub fn evaluate(&self, diameters: &[f64]) -> Vec<RollYield> {
        diameters
            .iter()
            .map(|&d| RollYield {
                roll_diameter_cm: d,
                labels: self.labels_for(d),
            })
            .collect()
    }
}

impl From<&FilmConfig> for RollSpec {
    fn from(cfg: &FilmConfig) -> Self {
        Self {
            thickness_mm: cfg.film_thickness_mm,
            core_diameter_cm: cfg.core_outer_diameter_cm,
            mark_set_length_cm: cfg.eye_mark_set_length_cm,
            labels_per_set: f64::from(cfg.labels_per_set),
        }
    }
}

/// One row of a batch evaluation
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RollYield {
    pub roll_diameter_cm: f64,
    pub labels: u64,
}
