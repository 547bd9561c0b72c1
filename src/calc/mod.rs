//! Derived quantities: label yield per roll

pub mod diameters;
pub mod roll;

pub use diameters::{parse_diameters, DiameterList};
pub use roll::{labels_per_roll, RollSpec, RollYield};
