//! Locating and loading extension libraries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use log::{debug, warn};

use crate::error::LibraryError;
use crate::plugin::traits::{EXTENSION_ENTRY_SYMBOL, ExtensionModule, ExtensionModuleCreateFn};

/// File extensions recognised as loadable units.
pub const LIBRARY_EXTENSIONS: &[&str] = &["so", "dll", "dylib"];

/// A discovered unit waiting to be indexed under its toolbox name.
pub struct LoadedUnit {
    pub name: String,
    /// File the module came from; `None` for in-process modules.
    pub location: Option<PathBuf>,
    pub module: Arc<dyn ExtensionModule>,
}

impl LoadedUnit {
    pub fn in_process(name: &str, module: Arc<dyn ExtensionModule>) -> Self {
        Self {
            name: name.to_string(),
            location: None,
            module,
        }
    }

    /// Human readable origin, for diagnostics.
    pub fn origin(&self) -> String {
        match &self.location {
            Some(path) => path.display().to_string(),
            None => "a built-in module".to_string(),
        }
    }
}

fn is_library(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| LIBRARY_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Candidate libraries in `dir` as (toolbox name, path), sorted by path.
///
/// A missing directory yields nothing.
pub fn package_candidates(dir: &Path) -> Result<Vec<(String, PathBuf)>, LibraryError> {
    if !dir.is_dir() {
        debug!("Package directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_library(&path) {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => candidates.push((stem.to_string(), path.clone())),
            None => warn!("Skipping library with a non UTF-8 name: {}", path.display()),
        }
    }
    candidates.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(candidates)
}

/// Opens a dynamic library and instantiates its extension module.
///
/// # Safety
/// Runs foreign initialisation code. The returned `Library` must outlive
/// the module and every callable obtained from it.
pub(crate) unsafe fn load_extension_module(
    path: &Path,
) -> Result<(Library, Arc<dyn ExtensionModule>), LibraryError> {
    let library = unsafe { Library::new(path)? };
    let raw = {
        let constructor: Symbol<ExtensionModuleCreateFn> =
            unsafe { library.get(EXTENSION_ENTRY_SYMBOL)? };
        unsafe { constructor() }
    };
    if raw.is_null() {
        return Err(LibraryError::Plugin(format!(
            "Extension constructor {} in {} returned null",
            String::from_utf8_lossy(EXTENSION_ENTRY_SYMBOL),
            path.display()
        )));
    }
    let module: Arc<dyn ExtensionModule> = unsafe { Arc::from(Box::from_raw(raw)) };
    Ok((library, module))
}
