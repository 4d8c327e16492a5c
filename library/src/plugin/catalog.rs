//! Extension catalog: discovers extension modules and indexes their exports
//! into toolboxes.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use libloading::Library;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;

use crate::builtin;
use crate::config::CatalogConfig;
use crate::error::LibraryError;
use crate::plugin::descriptor::CallableDescriptor;
use crate::plugin::documentation::Documentation;
use crate::plugin::export::{TypeExport, UNIVERSAL_BASE_TYPE};
use crate::plugin::loader::{self, LoadedUnit};
use crate::plugin::repository::{ToolboxEntry, ToolboxRepository};
use crate::plugin::traits::ExtensionModule;
use crate::util::timing::ScopedTimer;

/// Units found by [`ExtensionCatalog::discover`].
///
/// Fields drop in declaration order: modules loaded from a library must go
/// before the library that holds their code.
pub struct Discovery {
    units: Vec<LoadedUnit>,
    libraries: Vec<Library>,
}

impl Discovery {
    /// Sorted by toolbox name.
    pub fn units(&self) -> &[LoadedUnit] {
        &self.units
    }

    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }

    /// Releases the units and hands over the libraries they came from.
    fn into_libraries(self) -> Vec<Library> {
        let Discovery { units, libraries } = self;
        drop(units);
        libraries
    }
}

struct CatalogState {
    toolboxes: ToolboxRepository,
    // Dropped after `toolboxes`: callables may point into these libraries.
    libraries: Vec<Library>,
}

/// The process-wide catalog of callables.
///
/// Construct one at startup and pass it by reference to whatever builds or
/// loads graphs. Toolboxes are built on first access and kept for the life
/// of the catalog.
pub struct ExtensionCatalog {
    config: CatalogConfig,
    modules: Vec<(String, Arc<dyn ExtensionModule>)>,
    state: OnceCell<CatalogState>,
}

impl ExtensionCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
            state: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(CatalogConfig::from_env())
    }

    /// Adds an in-process extension module as an additional source.
    pub fn with_module(mut self, toolbox: &str, module: Arc<dyn ExtensionModule>) -> Self {
        self.modules.push((toolbox.to_string(), module));
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn is_built(&self) -> bool {
        self.state.get().is_some()
    }

    fn state(&self) -> Result<&CatalogState, LibraryError> {
        self.state.get_or_try_init(|| self.build())
    }

    fn state_mut(&mut self) -> Result<&mut CatalogState, LibraryError> {
        if self.state.get().is_none() {
            let state = self.build()?;
            let _ = self.state.set(state);
        }
        self.state
            .get_mut()
            .ok_or_else(|| LibraryError::runtime("catalog state is unavailable"))
    }

    /// All toolboxes, building the catalog if needed.
    pub fn toolboxes(&self) -> Result<&ToolboxRepository, LibraryError> {
        Ok(&self.state()?.toolboxes)
    }

    pub fn toolbox(&self, name: &str) -> Result<Option<&[ToolboxEntry]>, LibraryError> {
        Ok(self.toolboxes()?.get(name))
    }

    pub fn toolbox_names(&self) -> Result<Vec<String>, LibraryError> {
        Ok(self.toolboxes()?.names().map(str::to_string).collect())
    }

    /// Collects every configured source as a toolbox-named unit.
    ///
    /// Package libraries that fail to load are skipped. A toolbox name
    /// claimed twice is an error; nothing has been indexed at that point.
    pub fn discover(&self) -> Result<Discovery, LibraryError> {
        // Declared first so it drops last on early return.
        let mut libraries = Vec::new();
        let mut units: BTreeMap<String, LoadedUnit> = BTreeMap::new();

        if let Some(dir) = &self.config.package_dir {
            for (name, path) in loader::package_candidates(dir)? {
                match unsafe { loader::load_extension_module(&path) } {
                    Ok((library, module)) => {
                        debug!("Loaded extension library {}", path.display());
                        libraries.push(library);
                        let unit = LoadedUnit {
                            name: name.clone(),
                            location: Some(path),
                            module,
                        };
                        register_unit(&mut units, unit)?;
                    }
                    Err(e) => {
                        warn!("Skipping package {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
        }

        if self.config.include_builtins {
            for (name, module) in builtin::builtin_modules() {
                register_unit(&mut units, LoadedUnit::in_process(name, module))?;
            }
        }
        for (name, module) in &self.modules {
            register_unit(&mut units, LoadedUnit::in_process(name, module.clone()))?;
        }

        Ok(Discovery {
            units: units.into_values().collect(),
            libraries,
        })
    }

    /// Indexes one unit with the strategy its module supports.
    pub fn index(unit: &LoadedUnit, load_documentation: bool) -> Vec<ToolboxEntry> {
        let definitions = unit.module.toolbox_definitions();
        if !definitions.is_empty() {
            debug!(
                "Indexing `{}` from {} toolbox definition(s)",
                unit.name,
                definitions.len()
            );
            return definitions.iter().flat_map(|d| d.export_nodes()).collect();
        }

        let documentation = if load_documentation {
            unit.location.as_deref().and_then(Documentation::for_library)
        } else {
            None
        };
        index_exported_types(&unit.module.exported_types(), documentation.as_ref())
    }

    fn build(&self) -> Result<CatalogState, LibraryError> {
        let _timer = ScopedTimer::info("Indexing toolboxes");
        let discovery = self.discover()?;

        let frontend = if self.config.include_builtins {
            builtin::frontend_toolboxes()
        } else {
            Vec::new()
        };
        for (name, _) in &frontend {
            if let Some(unit) = discovery.units.iter().find(|u| u.name == *name) {
                return Err(LibraryError::DuplicateToolbox {
                    name: name.to_string(),
                    existing: unit.origin(),
                });
            }
        }

        let mut toolboxes = ToolboxRepository::new();
        for unit in &discovery.units {
            let _unit_timer = ScopedTimer::debug(format!("Indexing `{}`", unit.name));
            let entries = Self::index(unit, self.config.load_documentation);
            info!(
                "Indexed toolbox `{}` with {} callable(s) from {}",
                unit.name,
                entries.iter().filter(|e| !e.is_divider()).count(),
                unit.origin()
            );
            toolboxes.insert(&unit.name, entries);
        }
        let libraries = discovery.into_libraries();

        for (name, definition) in frontend {
            toolboxes.insert(name, definition.export_nodes());
        }
        if self.config.include_builtins {
            for (name, ty) in builtin::builtin_types() {
                toolboxes.append(name, type_entries(&ty));
            }
        }

        Ok(CatalogState {
            toolboxes,
            libraries,
        })
    }

    /// Appends one callable to `toolbox`.
    pub fn register(&mut self, toolbox: &str, descriptor: CallableDescriptor) -> Result<(), LibraryError> {
        self.register_many(toolbox, vec![descriptor])
    }

    /// Appends callables to `toolbox`, after a divider if it already has entries.
    pub fn register_many(
        &mut self,
        toolbox: &str,
        descriptors: Vec<CallableDescriptor>,
    ) -> Result<(), LibraryError> {
        let entries = descriptors.into_iter().map(ToolboxEntry::callable).collect();
        self.state_mut()?.toolboxes.append(toolbox, entries);
        Ok(())
    }

    /// Appends the constructors, instance methods and static methods of `ty`.
    pub fn register_type(&mut self, toolbox: &str, ty: &TypeExport) -> Result<(), LibraryError> {
        let entries = type_entries(ty);
        self.state_mut()?.toolboxes.append(toolbox, entries);
        Ok(())
    }

    /// Loads an extension library now and appends its exports to the toolbox
    /// named after the file. Returns that name.
    pub fn register_library(&mut self, path: &Path) -> Result<String, LibraryError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                LibraryError::InvalidArgument(format!("no library name in {}", path.display()))
            })?
            .to_string();
        let load_documentation = self.config.load_documentation;
        let state = self.state_mut()?;

        let (library, module) = unsafe { loader::load_extension_module(path)? };
        let unit = LoadedUnit {
            name: name.clone(),
            location: Some(path.to_path_buf()),
            module,
        };
        let entries = Self::index(&unit, load_documentation);
        drop(unit);
        info!("Registered library {} as `{}`", path.display(), name);

        state.libraries.push(library);
        state.toolboxes.append(&name, entries);
        Ok(name)
    }

    /// Resolves a persisted node's resource identifier.
    ///
    /// Front-end native entries are never matched; their owners rehydrate
    /// them.
    pub fn lookup(&self, resource_id: &str) -> Result<Arc<CallableDescriptor>, LibraryError> {
        let toolboxes = self.toolboxes()?;
        if toolboxes.is_empty() {
            return Err(LibraryError::NoToolboxesLoaded {
                resource_id: resource_id.to_string(),
            });
        }
        toolboxes
            .descriptors()
            .filter(|d| !d.frontend_native)
            .find(|d| d.resource_id() == resource_id)
            .cloned()
            .ok_or_else(|| LibraryError::NodeNotFound {
                resource_id: resource_id.to_string(),
                toolbox_count: toolboxes.len(),
            })
    }

    /// First callable in `toolbox` with display name `name`.
    pub fn find(&self, toolbox: &str, name: &str) -> Result<Option<Arc<CallableDescriptor>>, LibraryError> {
        Ok(self.toolbox(toolbox)?.and_then(|entries| {
            entries
                .iter()
                .filter_map(ToolboxEntry::descriptor)
                .find(|d| d.name == name)
                .cloned()
        }))
    }
}

fn register_unit(units: &mut BTreeMap<String, LoadedUnit>, unit: LoadedUnit) -> Result<(), LibraryError> {
    if let Some(existing) = units.get(&unit.name) {
        return Err(LibraryError::DuplicateToolbox {
            name: unit.name.clone(),
            existing: existing.origin(),
        });
    }
    units.insert(unit.name.clone(), unit);
    Ok(())
}

/// Generic indexing: static callables of abstract types and of types with
/// public static methods, one block per type, each followed by a divider.
fn index_exported_types(types: &[TypeExport], documentation: Option<&Documentation>) -> Vec<ToolboxEntry> {
    let candidates = types
        .iter()
        .filter(|t| t.is_public() && t.name != UNIVERSAL_BASE_TYPE);
    let abstract_types = candidates.clone().filter(|t| t.is_abstract);
    let static_holders = candidates.filter(|t| !t.static_methods().is_empty());

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for ty in abstract_types.chain(static_holders) {
        if !seen.insert(ty.full_name.as_str()) {
            continue;
        }
        for method in ty.static_methods() {
            let mut descriptor = CallableDescriptor::from_method(ty, method);
            if let Some(documentation) = documentation {
                descriptor.tooltip = documentation
                    .summary(&descriptor.documentation_signature())
                    .map(str::to_string);
            }
            entries.push(ToolboxEntry::callable(descriptor));
        }
        entries.push(ToolboxEntry::Divider);
    }
    entries
}

/// Constructors, then instance methods, then static methods of one type.
fn type_entries(ty: &TypeExport) -> Vec<ToolboxEntry> {
    let constructors = ty
        .public_constructors()
        .into_iter()
        .map(|c| CallableDescriptor::from_constructor(ty, c));
    let instance = ty
        .instance_methods()
        .into_iter()
        .map(|m| CallableDescriptor::from_method(ty, m));
    let statics = ty
        .static_methods()
        .into_iter()
        .map(|m| CallableDescriptor::from_method(ty, m));
    constructors
        .chain(instance)
        .chain(statics)
        .map(ToolboxEntry::callable)
        .collect()
}
