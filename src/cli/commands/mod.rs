//! CLI command implementations

pub mod cfg;
pub mod completions;
pub mod config;
pub mod init;
pub mod parts;
pub mod roll;
pub mod thk;
