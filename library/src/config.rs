//! Catalog configuration.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// Environment variable naming an alternate package directory.
pub const PACKAGES_ENV_VAR: &str = "AUTONODE_PACKAGES";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory scanned for extension libraries.
    pub package_dir: Option<PathBuf>,
    /// Register the toolboxes compiled into this crate.
    pub include_builtins: bool,
    /// Read `<library>.docs.json` next to each extension library.
    pub load_documentation: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            package_dir: default_package_dir(),
            include_builtins: true,
            load_documentation: true,
        }
    }
}

impl CatalogConfig {
    /// Defaults, with the package directory overridden by
    /// `AUTONODE_PACKAGES` when that names an existing directory.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_override(std::env::var_os(PACKAGES_ENV_VAR).map(PathBuf::from));
        config
    }

    /// Reads a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let text = fs::read_to_string(path)?;
        let config: CatalogConfig = toml::from_str(&text)?;
        info!("Loaded catalog config from {}", path.display());
        Ok(config)
    }

    /// Built-in toolboxes only; nothing is read from disk.
    pub fn builtins_only() -> Self {
        Self {
            package_dir: None,
            include_builtins: true,
            load_documentation: false,
        }
    }

    pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = Some(dir.into());
        self
    }

    fn apply_env_override(&mut self, value: Option<PathBuf>) {
        match value {
            Some(dir) if dir.is_dir() => {
                info!("Using package directory from {}: {}", PACKAGES_ENV_VAR, dir.display());
                self.package_dir = Some(dir);
            }
            Some(dir) => warn!(
                "{} points at {}, which is not a directory; ignoring",
                PACKAGES_ENV_VAR,
                dir.display()
            ),
            None => {}
        }
    }
}

/// Per-user application data directory for packages.
pub fn default_package_dir() -> Option<PathBuf> {
    ProjectDirs::from("org", "autonode", "autonode").map(|dirs| dirs.data_dir().join("Packages"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CatalogConfig = toml::from_str("include_builtins = false").unwrap();
        assert!(!config.include_builtins);
        assert!(config.load_documentation);
        assert_eq!(config.package_dir, default_package_dir());
    }

    #[test]
    fn test_env_override_requires_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CatalogConfig::builtins_only();

        config.apply_env_override(Some(dir.path().join("missing")));
        assert_eq!(config.package_dir, None);

        config.apply_env_override(Some(dir.path().to_path_buf()));
        assert_eq!(config.package_dir.as_deref(), Some(dir.path()));
    }
}
