//! Project discovery and initialization
//!
//! A project is any directory containing a `.varsel/` marker directory.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::{Config, CONFIG_FILE};

/// Marker directory for a project root
pub const PROJECT_DIR: &str = ".varsel";

const GITIGNORE_ENTRIES: &[&str] = &[
    ".varsel/catalog.db",
    ".varsel/catalog.db-journal",
    ".varsel/catalog.db-wal",
];

const SAMPLE_CATALOG: &str = r#"# Catalog files list global attribute values, templates and their variants.
attributes:
  - name: Size
    values: [S, M, L]
  - name: Color
    values: [Red, Blue]
templates:
  - code: SHIRT
    attributes: [Size, Color]
variants:
  - code: SHIRT-S-RED
    variant_of: SHIRT
    attributes: { Size: S, Color: Red }
  - code: SHIRT-S-BLUE
    variant_of: SHIRT
    attributes: { Size: S, Color: Blue }
  - code: SHIRT-M-RED
    variant_of: SHIRT
    attributes: { Size: M, Color: Red }
"#;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a varsel project (or any parent directory): {0}")]
    NotFound(PathBuf),

    #[error("project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered project root
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Walk up from the current directory looking for `.varsel/`
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Walk up from `start` looking for `.varsel/`
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self {
                    root: current.to_path_buf(),
                });
            }
            dir = current.parent();
        }
        Err(ProjectError::NotFound(start.to_path_buf()))
    }

    /// Create the project layout under `root`
    ///
    /// Writes the default config, an example catalog file, and `.gitignore`
    /// entries for the database. Refuses to touch an existing project unless
    /// `force` is set.
    pub fn init(root: &Path, force: bool) -> Result<Self, ProjectError> {
        let marker = root.join(PROJECT_DIR);
        if marker.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }

        let config = Config::default();
        fs::create_dir_all(&marker)?;
        fs::write(root.join(CONFIG_FILE), config.to_yaml())?;

        let catalog_dir = config.catalog_path(root);
        fs::create_dir_all(&catalog_dir)?;
        let sample = catalog_dir.join("example.yaml");
        if !sample.exists() {
            fs::write(&sample, SAMPLE_CATALOG)?;
        }

        Self::update_gitignore(root)?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn update_gitignore(root: &Path) -> std::io::Result<()> {
        let path = root.join(".gitignore");
        let mut content = fs::read_to_string(&path).unwrap_or_default();
        for entry in GITIGNORE_ENTRIES {
            if !content.lines().any(|l| l.trim() == *entry) {
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(entry);
                content.push('\n');
            }
        }
        fs::write(path, content)
    }

    /// The project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load this project's configuration
    pub fn config(&self) -> Result<Config, crate::yaml::YamlError> {
        Config::load(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        assert!(project.root().join(".varsel").is_dir());
        assert!(project.root().join(CONFIG_FILE).exists());
        assert!(project.root().join("catalog/example.yaml").exists());

        let gitignore = fs::read_to_string(project.root().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".varsel/catalog.db"));
    }

    #[test]
    fn test_init_twice_requires_force() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();

        assert!(matches!(
            Project::init(tmp.path(), false),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(Project::init(tmp.path(), true).is_ok());

        // gitignore entries are not duplicated
        let gitignore = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert_eq!(gitignore.matches(".varsel/catalog.db\n").count(), 1);
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();
        let nested = tmp.path().join("catalog/deep/er");
        fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_outside_project_fails() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound(_))
        ));
    }
}
