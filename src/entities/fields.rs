//! Numeric field constraints shared by prompts, flags and display

use miette::Diagnostic;
use thiserror::Error;

/// Entry constraints for one numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column / flag name
    pub name: &'static str,
    /// Prompt label
    pub label: &'static str,
    /// Smallest accepted value (inclusive)
    pub min: f64,
    /// Increment used by interactive entry
    pub step: f64,
    /// Decimals shown when displaying the value
    pub decimals: usize,
}

pub const FILM_THICKNESS: FieldSpec = FieldSpec {
    name: "film_thickness_mm",
    label: "Film thickness (mm)",
    min: 0.001,
    step: 0.001,
    decimals: 3,
};

pub const CORE_DIAMETER: FieldSpec = FieldSpec {
    name: "core_outer_diameter_cm",
    label: "Core outer diameter (cm)",
    min: 0.1,
    step: 0.1,
    decimals: 1,
};

pub const MARK_SET_LENGTH: FieldSpec = FieldSpec {
    name: "eye_mark_set_length_cm",
    label: "Eye-mark set length (cm)",
    min: 0.1,
    step: 0.01,
    decimals: 2,
};

pub const LABELS_PER_SET: FieldSpec = FieldSpec {
    name: "labels_per_set",
    label: "Labels per set",
    min: 1.0,
    step: 1.0,
    decimals: 0,
};

pub const MEASUREMENT: FieldSpec = FieldSpec {
    name: "measurement",
    label: "Thickness measurement (mm)",
    min: 0.0,
    step: 0.001,
    decimals: 3,
};

impl FieldSpec {
    /// Check a value against the field minimum
    pub fn check(&self, value: f64) -> Result<f64, ValidationError> {
        if value.is_nan() {
            return Err(ValidationError::NotANumber {
                field: self.name.to_string(),
            });
        }
        if value < self.min {
            return Err(ValidationError::BelowMinimum {
                field: self.name.to_string(),
                value,
                min: self.min,
            });
        }
        Ok(value)
    }

    /// Parse user text and check it
    pub fn parse(&self, raw: &str) -> Result<f64, ValidationError> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::Unparseable {
                field: self.name.to_string(),
                raw: raw.trim().to_string(),
            })?;
        self.check(value)
    }

    /// Format with the field's display precision
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }
}

/// Rejected user input
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum ValidationError {
    #[error("{field}: {value} is below the minimum of {min}")]
    #[diagnostic(code(filmtk::validation::below_minimum))]
    BelowMinimum { field: String, value: f64, min: f64 },

    #[error("{field}: '{raw}' is not a number")]
    #[diagnostic(code(filmtk::validation::unparseable))]
    Unparseable { field: String, raw: String },

    #[error("{field}: value is not a number")]
    #[diagnostic(code(filmtk::validation::nan))]
    NotANumber { field: String },

    #[error("{field}: {value} must be a whole number")]
    #[diagnostic(code(filmtk::validation::not_whole))]
    NotWhole { field: String, value: f64 },

    #[error("measurement position {position} is out of range (1-{max})")]
    #[diagnostic(code(filmtk::validation::position))]
    Position { position: usize, max: usize },

    #[error("too many measurements: got {got}, at most {max}")]
    #[diagnostic(code(filmtk::validation::too_many))]
    TooMany { got: usize, max: usize },
}
