//! Extension discovery and the callable catalog.

pub mod catalog;
pub mod descriptor;
pub mod documentation;
pub mod export;
pub mod loader;
pub mod repository;
pub mod traits;

pub use catalog::{Discovery, ExtensionCatalog};
pub use descriptor::{CallableDescriptor, CallableKind};
pub use documentation::Documentation;
pub use export::{Invoker, MethodExport, ParameterInfo, Receiver, TypeExport, Visibility};
pub use loader::LoadedUnit;
pub use repository::{ToolboxEntry, ToolboxRepository};
pub use traits::{ExtensionModule, ExtensionModuleCreateFn, ToolboxDefinition};
