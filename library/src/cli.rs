//! Command line front-end over the catalog.
//!
//! - `list` - toolbox names and sizes
//! - `show <toolbox>` - the callables of one toolbox
//! - `run <resource-id> [args...]` - execute one callable with text arguments

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::debug;

use crate::config::CatalogConfig;
use crate::error::LibraryError;
use crate::model::Value;
use crate::node::{AutomaticNode, PinRef};
use crate::plugin::{ExtensionCatalog, ToolboxEntry};

#[derive(Parser, Debug)]
#[command(name = "autonode")]
#[command(version, about = "Browse and run catalog callables", long_about = None)]
pub struct Cli {
    /// Catalog configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory scanned for extension libraries
    #[arg(short, long, global = true)]
    pub packages: Option<PathBuf>,

    /// Skip the toolboxes compiled into the library
    #[arg(long, global = true)]
    pub no_builtins: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List toolboxes
    List,

    /// Show the callables of a toolbox
    Show {
        /// Toolbox name
        toolbox: String,
    },

    /// Execute a callable by resource identifier
    Run {
        /// e.g. `Standard.Calculator.Add(f64,f64)`
        resource_id: String,

        /// Input values in pin order; `[..]` is read as a JSON array
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Cli {
    fn catalog_config(&self) -> Result<CatalogConfig, LibraryError> {
        let mut config = match &self.config {
            Some(path) => CatalogConfig::load(path)?,
            None => CatalogConfig::from_env(),
        };
        if let Some(dir) = &self.packages {
            config = config.with_package_dir(dir.clone());
        }
        if self.no_builtins {
            config.include_builtins = false;
        }
        Ok(config)
    }
}

pub fn execute(cli: Cli) -> Result<(), LibraryError> {
    let config = cli.catalog_config()?;
    debug!("Catalog config: {:?}", config);
    let catalog = ExtensionCatalog::new(config);

    match cli.command {
        Commands::List => list(&catalog),
        Commands::Show { toolbox } => show(&catalog, &toolbox),
        Commands::Run { resource_id, args } => run_callable(&catalog, &resource_id, &args),
    }
}

fn list(catalog: &ExtensionCatalog) -> Result<(), LibraryError> {
    for (name, entries) in catalog.toolboxes()?.iter() {
        let count = entries.iter().filter(|e| !e.is_divider()).count();
        println!("{:<24} {} callable(s)", name, count);
    }
    Ok(())
}

fn show(catalog: &ExtensionCatalog, toolbox: &str) -> Result<(), LibraryError> {
    let entries = catalog
        .toolbox(toolbox)?
        .ok_or_else(|| LibraryError::InvalidArgument(format!("no toolbox named `{}`", toolbox)))?;
    for entry in entries {
        match entry {
            ToolboxEntry::Divider => println!("  ----"),
            ToolboxEntry::Callable(descriptor) => {
                println!("  {:<20} {}", descriptor.name, descriptor.resource_id());
                if let Some(tooltip) = &descriptor.tooltip {
                    println!("  {:<20} {}", "", tooltip);
                }
            }
        }
    }
    Ok(())
}

/// Reads `[..]` as a JSON array, anything else as text for the pin to coerce.
pub fn parse_argument(text: &str) -> Value {
    if text.trim_start().starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(text) {
            return Value::Array(items.into_iter().map(json_to_value).collect());
        }
    }
    Value::from(text)
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::from(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(json_to_value).collect()),
        other => Value::from(other.to_string()),
    }
}

fn run_callable(catalog: &ExtensionCatalog, resource_id: &str, args: &[String]) -> Result<(), LibraryError> {
    let descriptor = catalog.lookup(resource_id)?;
    let mut node = AutomaticNode::new(descriptor);
    if args.len() > node.inputs().len() {
        return Err(LibraryError::InvalidArgument(format!(
            "`{}` takes {} input(s) but {} were given",
            node.node_type(),
            node.inputs().len(),
            args.len()
        )));
    }
    for (index, arg) in args.iter().enumerate() {
        if let Some(pin) = node.input_mut(index) {
            pin.default = Some(parse_argument(arg));
        }
    }

    let result = node.execute(&HashMap::<PinRef, Value>::new());
    println!("{}", result.message.content);
    if result.is_error() {
        return Err(LibraryError::runtime(result.message.content));
    }
    for (index, pin) in node.outputs().iter().enumerate() {
        if let Some(value) = result.output(index) {
            println!("{} = {}", pin.title, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argument() {
        assert_eq!(parse_argument("3"), Value::from("3"));
        assert_eq!(
            parse_argument("[1, 2.5, \"x\"]"),
            Value::Array(vec![Value::from(1i64), Value::from(2.5), Value::from("x")])
        );
        assert_eq!(parse_argument("[oops"), Value::from("[oops"));
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::parse_from(["autonode", "run", "Standard.Calculator.Add(f64,f64)", "1", "2"]);
        match cli.command {
            Commands::Run { resource_id, args } => {
                assert_eq!(resource_id, "Standard.Calculator.Add(f64,f64)");
                assert_eq!(args, vec!["1", "2"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
