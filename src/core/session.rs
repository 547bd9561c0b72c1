//! Session state: catalog plus both editable tables
//!
//! A session loads the catalog once and keeps it immutable until
//! [`Session::reload_catalog`] is called. The two tables are held in memory
//! and written through to disk on each explicit save. Nothing guards
//! against a second session writing the same files; the last save wins.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::catalog::{load_catalog, Catalog, CatalogEntry, CatalogError, CatalogSource};
use crate::core::table::{StoreError, Upsert};
use crate::core::{Config, Project};
use crate::entities::film_config::{FilmConfig, FilmConfigTable};
use crate::entities::thickness::{ThicknessEntry, ThicknessRecord, ThicknessTable};
use crate::entities::ValidationError;

pub struct Session {
    catalog_source: CatalogSource,
    catalog: Catalog,
    catalog_error: Option<CatalogError>,
    film_config_path: PathBuf,
    film_configs: FilmConfigTable,
    thickness_path: PathBuf,
    thickness: ThicknessTable,
}

impl Session {
    /// Load the catalog and both tables for a project
    pub fn open(project: &Project, config: &Config) -> Result<Self, SessionError> {
        let catalog_source = CatalogSource::from_config(config, project);
        let film_config_path = project.resolve_path(config.film_config_file());
        let thickness_path = project.resolve_path(config.film_thickness_file());
        Self::open_paths(catalog_source, film_config_path, thickness_path)
    }

    pub fn open_paths(
        catalog_source: CatalogSource,
        film_config_path: PathBuf,
        thickness_path: PathBuf,
    ) -> Result<Self, SessionError> {
        let (catalog, catalog_error) = load_catalog(&catalog_source);
        let film_configs = FilmConfigTable::load(&film_config_path)?;
        let thickness = ThicknessTable::load(&thickness_path)?;

        Ok(Self {
            catalog_source,
            catalog,
            catalog_error,
            film_config_path,
            film_configs,
            thickness_path,
            thickness,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Why the catalog is empty, if it failed to load
    pub fn catalog_error(&self) -> Option<&CatalogError> {
        self.catalog_error.as_ref()
    }

    /// Re-read the catalog source, e.g. after the BOM was edited
    pub fn reload_catalog(&mut self) {
        let (catalog, error) = load_catalog(&self.catalog_source);
        self.catalog = catalog;
        self.catalog_error = error;
    }

    /// The catalog, or an error when there is nothing to select from
    pub fn require_catalog(&self) -> Result<&Catalog, SessionError> {
        if self.catalog.is_empty() {
            return Err(SessionError::CatalogUnavailable {
                reason: self
                    .catalog_error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "catalog has no part numbers".to_string()),
            });
        }
        Ok(&self.catalog)
    }

    /// Resolve a part number against the catalog
    pub fn require_part(&self, part_number: &str) -> Result<&CatalogEntry, SessionError> {
        self.require_catalog()?
            .get(part_number)
            .ok_or_else(|| SessionError::UnknownPart {
                part_number: part_number.trim().to_string(),
            })
    }

    pub fn film_configs(&self) -> &FilmConfigTable {
        &self.film_configs
    }

    pub fn thickness(&self) -> &ThicknessTable {
        &self.thickness
    }

    pub fn film_config_path(&self) -> &PathBuf {
        &self.film_config_path
    }

    pub fn thickness_path(&self) -> &PathBuf {
        &self.thickness_path
    }

    /// Stored parameters for a part number, or the placeholder defaults
    pub fn film_config_or_default(&self, entry: &CatalogEntry) -> FilmConfig {
        self.film_configs
            .get(&entry.part_number)
            .cloned()
            .unwrap_or_else(|| FilmConfig::with_defaults(&entry.part_number, &entry.part_name))
    }

    /// Validate, upsert and write the film_config table
    pub fn save_film_config(&mut self, mut config: FilmConfig) -> Result<Upsert, SessionError> {
        let part = self.require_part(&config.part_number)?.clone();
        config.validate()?;
        config.part_number = part.part_number;
        config.part_name = part.part_name;

        let mut updated = self.film_configs.clone();
        let outcome = updated.upsert(config);
        updated.save(&self.film_config_path)?;
        self.film_configs = updated;
        Ok(outcome)
    }

    /// Recompute statistics, upsert and write the film_thickness table
    pub fn save_thickness(
        &mut self,
        mut entry: ThicknessEntry,
    ) -> Result<(ThicknessRecord, Upsert), SessionError> {
        let part = self.require_part(&entry.part_number)?.clone();
        for &value in &entry.measurements {
            crate::entities::fields::MEASUREMENT.check(value)?;
        }
        entry.part_number = part.part_number;
        entry.part_name = part.part_name;

        let mut updated = self.thickness.clone();
        let result = updated.record_measurements(entry);
        updated.save(&self.thickness_path)?;
        self.thickness = updated;
        Ok(result)
    }
}

/// Errors surfaced by session operations
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("no parts catalog available: {reason}")]
    #[diagnostic(
        code(filmtk::session::no_catalog),
        help("check `catalog_file`, `catalog_sheet` and the column settings with `filmtk config show`")
    )]
    CatalogUnavailable { reason: String },

    #[error("part number '{part_number}' is not in the catalog")]
    #[diagnostic(
        code(filmtk::session::unknown_part),
        help("use `filmtk parts list` to see available part numbers")
    )]
    UnknownPart { part_number: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}
