//! Extension catalog and automatic graph nodes.
//!
//! Extensions publish callables, either through explicit toolbox
//! definitions or as exported types. The [`ExtensionCatalog`] indexes them
//! into named toolboxes and [`AutomaticNode`] turns any indexed callable
//! into a node with typed pins.

pub mod builtin;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod node;
pub mod plugin;
pub mod util;

use clap::Parser;

pub use config::CatalogConfig;
pub use error::LibraryError;
pub use graph::{Graph, GraphState, ResolutionFailure};
pub use model::{Value, ValueType};
pub use node::{AutomaticNode, AutomaticNodeState, NodeExecutionResult, PinRef};
pub use plugin::{CallableDescriptor, ExtensionCatalog, ExtensionModule, ToolboxEntry};

/// Entry point of the `autonode-cli` binary.
pub fn run(args: Vec<String>) -> Result<(), LibraryError> {
    cli::execute(cli::Cli::parse_from(args))
}
