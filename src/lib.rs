//! filmtk: Film Roll Toolkit
//!
//! Manages per-part film parameters and thickness measurements against a
//! reference parts catalog, and computes label yield per roll.

pub mod calc;
pub mod cli;
pub mod core;
pub mod entities;
