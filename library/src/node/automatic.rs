//! Nodes generated directly from catalog callables.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::node::pin::{Connection, InputPin, OutputPin, ValueSource};
use crate::node::result::NodeExecutionResult;
use crate::plugin::{CallableDescriptor, ExtensionCatalog};
use crate::util::timing::timed;

/// Fields of an [`AutomaticNode`] that survive persistence.
///
/// The descriptor is a live binding to loaded code and is never stored; it
/// is looked up again by `resource_id`. Names are only present when a user
/// renamed pins; the counts keep placeholder pins (and their connections)
/// alive until the node is resolved.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AutomaticNodeState {
    pub id: Uuid,
    pub node_type: String,
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_names: Option<Vec<String>>,
    #[serde(default)]
    pub input_count: usize,
    #[serde(default)]
    pub output_count: usize,
}

pub struct AutomaticNode {
    pub id: Uuid,
    node_type: String,
    resource_id: String,
    descriptor: Option<Arc<CallableDescriptor>>,
    input_types: Vec<ValueType>,
    output_types: Vec<ValueType>,
    default_input_values: Option<Vec<Option<Value>>>,
    /// Custom pin names; `None` means titles come from the descriptor.
    input_names: Option<Vec<String>>,
    output_names: Option<Vec<String>>,
    inputs: Vec<InputPin>,
    outputs: Vec<OutputPin>,
    cache: HashMap<usize, Value>,
}

impl AutomaticNode {
    pub fn new(descriptor: Arc<CallableDescriptor>) -> Self {
        let mut node = Self {
            id: Uuid::new_v4(),
            node_type: descriptor.name.clone(),
            resource_id: descriptor.resource_id(),
            descriptor: None,
            input_types: Vec::new(),
            output_types: Vec::new(),
            default_input_values: None,
            input_names: None,
            output_names: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            cache: HashMap::new(),
        };
        node.attach(descriptor);
        node
    }

    /// Structural rebuild from persisted fields.
    ///
    /// Pins are untyped placeholders until [`AutomaticNode::resolve`] runs;
    /// the node cannot execute before that.
    pub fn from_state(state: AutomaticNodeState) -> Self {
        let input_count = state
            .input_count
            .max(state.input_names.as_ref().map_or(0, Vec::len));
        let output_count = state
            .output_count
            .max(state.output_names.as_ref().map_or(0, Vec::len));
        let inputs = (0..input_count)
            .map(|index| InputPin::placeholder(name_at(&state.input_names, index).unwrap_or("Input")))
            .collect();
        let outputs = (0..output_count)
            .map(|index| OutputPin::for_type(&ValueType::Any, name_at(&state.output_names, index)))
            .collect();
        Self {
            id: state.id,
            node_type: state.node_type,
            resource_id: state.resource_id,
            descriptor: None,
            input_types: Vec::new(),
            output_types: Vec::new(),
            default_input_values: None,
            input_names: state.input_names,
            output_names: state.output_names,
            inputs,
            outputs,
            cache: HashMap::new(),
        }
    }

    pub fn state(&self) -> AutomaticNodeState {
        AutomaticNodeState {
            id: self.id,
            node_type: self.node_type.clone(),
            resource_id: self.resource_id.clone(),
            input_names: self.input_names.clone(),
            output_names: self.output_names.clone(),
            input_count: self.inputs.len(),
            output_count: self.outputs.len(),
        }
    }

    /// Re-attaches the live descriptor after deserialization.
    pub fn resolve(&mut self, catalog: &ExtensionCatalog) -> Result<(), LibraryError> {
        let descriptor = catalog.lookup(&self.resource_id)?;
        debug!("Resolved node `{}` to {}", self.node_type, self.resource_id);
        self.attach(descriptor);
        Ok(())
    }

    fn attach(&mut self, descriptor: Arc<CallableDescriptor>) {
        self.input_types = descriptor.input_types.clone();
        self.output_types = descriptor.output_types.clone();
        self.default_input_values = descriptor.default_input_values.clone();
        self.descriptor = Some(descriptor);
        self.populate_pins();
    }

    /// Rebuilds pins from the declared types, keeping existing connections
    /// by index. Custom names win over the descriptor's parameter names.
    fn populate_pins(&mut self) {
        let mut previous: Vec<Vec<Connection>> =
            self.inputs.iter_mut().map(InputPin::take_connections).collect();

        self.inputs = self
            .input_types
            .iter()
            .enumerate()
            .map(|(index, input_type)| {
                let default = self
                    .default_input_values
                    .as_ref()
                    .and_then(|defaults| defaults.get(index).cloned().flatten());
                let title = name_at(&self.input_names, index).or_else(|| {
                    self.descriptor
                        .as_ref()
                        .and_then(|d| name_at(&d.input_names, index))
                });
                InputPin::for_type(input_type, default, title)
            })
            .collect();
        for (pin, connections) in self.inputs.iter_mut().zip(previous.drain(..)) {
            pin.restore_connections(connections);
        }

        self.outputs = self
            .output_types
            .iter()
            .enumerate()
            .map(|(index, output_type)| {
                let title = name_at(&self.output_names, index).or_else(|| {
                    self.descriptor
                        .as_ref()
                        .and_then(|d| name_at(&d.output_names, index))
                });
                OutputPin::for_type(output_type, title)
            })
            .collect();
        self.cache.clear();
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn descriptor(&self) -> Option<&Arc<CallableDescriptor>> {
        self.descriptor.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn inputs(&self) -> &[InputPin] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputPin] {
        &self.outputs
    }

    pub fn input_mut(&mut self, index: usize) -> Option<&mut InputPin> {
        self.inputs.get_mut(index)
    }

    /// Sets a custom display name for an input pin.
    pub fn rename_input(&mut self, index: usize, title: &str) -> Result<(), LibraryError> {
        let count = self.inputs.len();
        let pin = self.inputs.get_mut(index).ok_or_else(|| {
            LibraryError::InvalidArgument(format!("input {} out of range ({} inputs)", index, count))
        })?;
        pin.title = title.to_string();
        self.input_names = Some(self.inputs.iter().map(|p| p.title.clone()).collect());
        Ok(())
    }

    /// Sets a custom display name for an output pin.
    pub fn rename_output(&mut self, index: usize, title: &str) -> Result<(), LibraryError> {
        let count = self.outputs.len();
        let pin = self.outputs.get_mut(index).ok_or_else(|| {
            LibraryError::InvalidArgument(format!("output {} out of range ({} outputs)", index, count))
        })?;
        pin.title = title.to_string();
        self.output_names = Some(self.outputs.iter().map(|p| p.title.clone()).collect());
        Ok(())
    }

    /// Last computed value of an output pin.
    pub fn output_value(&self, index: usize) -> Option<&Value> {
        self.cache.get(&index)
    }

    /// Drops cached outputs, e.g. when an upstream failure skipped this node.
    pub fn clear_outputs(&mut self) {
        self.cache.clear();
    }

    pub fn should_have_auto_connection(&self) -> bool {
        self.inputs.iter().any(InputPin::requires_auto_connection)
    }

    /// Resolves inputs, calls the bound callable and caches its outputs.
    ///
    /// Every failure becomes an error result; nothing propagates.
    pub fn execute(&mut self, source: &dyn ValueSource) -> NodeExecutionResult {
        match self.run(source) {
            Ok((outputs, elapsed)) => {
                self.cache = outputs.into_iter().enumerate().collect();
                NodeExecutionResult::finished(elapsed, self.cache.clone())
            }
            Err(e) => {
                debug!("Node `{}` failed: {}", self.node_type, e);
                self.cache.clear();
                NodeExecutionResult::error(&e.innermost_message())
            }
        }
    }

    fn run(&self, source: &dyn ValueSource) -> Result<(Vec<Value>, std::time::Duration), LibraryError> {
        let descriptor = self
            .descriptor
            .as_ref()
            .ok_or_else(|| LibraryError::Unresolved(self.node_type.clone()))?;
        let args = self
            .inputs
            .iter()
            .map(|pin| pin.resolve(source))
            .collect::<Result<Vec<_>, _>>()?;

        let (outcome, elapsed) =
            timed(|| panic::catch_unwind(AssertUnwindSafe(|| descriptor.invoke(&args))));
        let outputs = match outcome {
            Ok(result) => result,
            Err(payload) => Err(LibraryError::runtime(panic_message(payload.as_ref()))),
        }
        .map_err(|e| LibraryError::Invocation {
            callable: descriptor.name.clone(),
            source: Box::new(e),
        })?;
        Ok((outputs, elapsed))
    }
}

fn name_at(names: &Option<Vec<String>>, index: usize) -> Option<&str> {
    names.as_ref().and_then(|n| n.get(index)).map(String::as_str)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callable panicked".to_string()
    }
}
