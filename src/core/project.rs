//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory that marks a project root
pub const PROJECT_DIR: &str = ".filmtk";

/// Represents a filmtk project: a directory holding the catalog and both tables
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .filmtk/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Use an explicit project root when given, otherwise discover one
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::write_skeleton(root)
    }

    /// Force initialization even if .filmtk/ exists (rewrites config.yaml)
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::write_skeleton(root)
    }

    fn write_skeleton(root: PathBuf) -> Result<Self, ProjectError> {
        let dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# filmtk project configuration
# Relative paths resolve against the project root.

# Reference parts catalog (xlsx/xls/ods workbook or csv)
# catalog_file: BOM.xlsx
# catalog_sheet: Sheet1

# Exact header labels in the catalog. Duplicate headers are numbered
# X, X.1, X.2 ... so the second "품명" column is "품명.1".
# part_number_column: 품번
# part_name_column: 품명.1

# Persisted tables
# film_config_file: film_config.csv
# film_thickness_file: film_thickness.csv
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .filmtk configuration directory
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Resolve a configured path against the project root
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a filmtk project (searched from {searched_from:?}). Run 'filmtk init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("filmtk project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.project_dir().join("config.yaml").is_file());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let result = Project::init(tmp.path());
        assert!(matches!(result, Err(ProjectError::AlreadyExists(_))));
    }

    #[test]
    fn test_project_init_force_overwrites() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        assert!(Project::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_not_found() {
        let tmp = tempdir().unwrap();
        let result = Project::discover_from(tmp.path());
        assert!(matches!(result, Err(ProjectError::NotFound { .. })));
    }

    #[test]
    fn test_resolve_path_relative_and_absolute() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert_eq!(
            project.resolve_path("film_config.csv"),
            project.root().join("film_config.csv")
        );
        let abs = tmp.path().join("elsewhere.csv");
        assert_eq!(project.resolve_path(abs.to_str().unwrap()), abs);
    }
}
