//! Record types stored in the project tables

pub mod fields;
pub mod film_config;
pub mod thickness;

pub use fields::{FieldSpec, ValidationError};
pub use film_config::{FilmConfig, FilmConfigTable};
pub use thickness::{compute_stats, ThicknessEntry, ThicknessRecord, ThicknessTable};
