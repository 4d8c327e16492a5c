//! Literal nodes owned by the host front-end.
//!
//! These pass their single input straight through so a graph can hold
//! constants. They are never resolved through the catalog; the front-end
//! rebuilds them itself.

use crate::model::ValueType;
use crate::plugin::{CallableDescriptor, ToolboxDefinition, ToolboxEntry};

const DECLARING_TYPE: &str = "Frontend.Basic";

pub struct BasicToolbox;

fn literal(name: &str, value_type: ValueType, title: &str) -> ToolboxEntry {
    let descriptor = CallableDescriptor::function(
        DECLARING_TYPE,
        name,
        vec![value_type.clone()],
        vec![value_type],
        |args| Ok(args.to_vec()),
    )
    .with_input_names(&[title])
    .with_output_names(&[title])
    .with_tooltip(format!("A constant {} value.", name.to_lowercase()))
    .frontend_native();
    ToolboxEntry::callable(descriptor)
}

impl ToolboxDefinition for BasicToolbox {
    fn export_nodes(&self) -> Vec<ToolboxEntry> {
        vec![
            literal("Number", ValueType::F64, "Number"),
            literal("Text", ValueType::String, "Text"),
            literal("Boolean", ValueType::Boolean, "Truth"),
            ToolboxEntry::Divider,
            literal("Date", ValueType::DateTime, "Date"),
            literal("Color", ValueType::Color, "Color"),
        ]
    }
}
