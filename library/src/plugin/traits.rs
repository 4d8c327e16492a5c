//! Extension traits.

use crate::plugin::repository::ToolboxEntry;
use crate::plugin::export::TypeExport;

/// A loadable unit of callables.
///
/// A module either provides self-describing toolbox definitions, whose
/// entries are taken as-is, or exports plain types that the catalog indexes
/// itself. When both are present the definitions win.
pub trait ExtensionModule: Send + Sync {
    fn toolbox_definitions(&self) -> Vec<Box<dyn ToolboxDefinition>> {
        Vec::new()
    }

    fn exported_types(&self) -> Vec<TypeExport> {
        Vec::new()
    }
}

/// An explicit listing of a toolbox's exports, dividers included.
pub trait ToolboxDefinition: Send + Sync {
    fn export_nodes(&self) -> Vec<ToolboxEntry>;
}

/// Symbol exported by dynamic extension libraries.
pub const EXTENSION_ENTRY_SYMBOL: &[u8] = b"create_extension_module";

/// Signature of [`EXTENSION_ENTRY_SYMBOL`].
pub type ExtensionModuleCreateFn = unsafe extern "C" fn() -> *mut dyn ExtensionModule;
