//! Pins and connections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LibraryError;
use crate::model::{NumericKind, Value, ValueType};

/// Identifies an output pin on a node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub node: Uuid,
    pub pin: usize,
}

impl PinRef {
    pub fn new(node: Uuid, pin: usize) -> Self {
        Self { node, pin }
    }
}

/// An incoming edge on an input pin.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub source: PinRef,
    /// Declared type of the upstream output.
    pub data_type: ValueType,
}

impl Connection {
    pub fn new(source: PinRef, data_type: ValueType) -> Self {
        Self { source, data_type }
    }
}

/// Where input pins pull upstream values from.
pub trait ValueSource {
    fn value_of(&self, source: &PinRef) -> Option<Value>;
}

impl ValueSource for HashMap<PinRef, Value> {
    fn value_of(&self, source: &PinRef) -> Option<Value> {
        self.get(source).cloned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinKind {
    Boolean,
    Text,
    Number(NumericKind),
    Date,
    Color,
    Generic,
}

#[derive(Clone, Debug)]
pub struct InputPin {
    pub title: String,
    pub kind: PinKind,
    /// Declared type with one level of `Optional` removed.
    pub data_type: ValueType,
    pub default: Option<Value>,
    pub allows_array_coercion: bool,
    connections: Vec<Connection>,
}

impl InputPin {
    /// Builds the pin for a declared parameter type.
    ///
    /// `Optional` is unwrapped, so an optional parameter that receives
    /// nothing gets the type default rather than `Null`.
    pub fn for_type(declared: &ValueType, default: Option<Value>, title: Option<&str>) -> Self {
        let data_type = declared.unwrap_optional().clone();
        let (kind, fallback) = match &data_type {
            ValueType::Boolean => (PinKind::Boolean, "Bool"),
            ValueType::String => (PinKind::Text, "String"),
            ValueType::Numeric(kind) => (PinKind::Number(*kind), "Number"),
            ValueType::DateTime => (PinKind::Date, "Date"),
            ValueType::Color => (PinKind::Color, "Color"),
            _ => (PinKind::Generic, "Input"),
        };
        Self {
            title: title.unwrap_or(fallback).to_string(),
            kind,
            allows_array_coercion: data_type.is_array(),
            data_type,
            default: default.filter(|v| !v.is_null()),
            connections: Vec::new(),
        }
    }

    /// Untyped stand-in used until a node is resolved.
    pub fn placeholder(title: &str) -> Self {
        Self::for_type(&ValueType::Any, None, Some(title))
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Adds an edge. Pins that do not pack arrays keep only the newest one.
    pub fn connect(&mut self, connection: Connection) {
        if !self.allows_array_coercion {
            self.connections.clear();
        }
        self.connections.push(connection);
    }

    pub fn disconnect(&mut self, source: &PinRef) {
        self.connections.retain(|c| c.source != *source);
    }

    /// Drops every connection coming from `node`.
    pub fn disconnect_node(&mut self, node: Uuid) {
        self.connections.retain(|c| c.source.node != node);
    }

    pub(crate) fn take_connections(&mut self) -> Vec<Connection> {
        std::mem::take(&mut self.connections)
    }

    pub(crate) fn restore_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    /// Pins with an inline editor (booleans, text, numbers, dates, colors).
    pub fn is_primitive(&self) -> bool {
        self.kind != PinKind::Generic
    }

    /// An unconnected generic pin without a default can only be fed by an
    /// upstream node.
    pub fn requires_auto_connection(&self) -> bool {
        !self.is_primitive() && !self.is_connected() && self.default.is_none()
    }

    fn fed_by_array(&self) -> bool {
        self.connections.iter().any(|c| c.data_type.is_array())
    }

    fn pull(&self, connection: &Connection, source: &dyn ValueSource) -> Result<Value, LibraryError> {
        source
            .value_of(&connection.source)
            .ok_or_else(|| LibraryError::MissingInput(self.title.clone()))
    }

    /// Value of the pin for one execution, coerced to its declared type.
    pub fn resolve(&self, source: &dyn ValueSource) -> Result<Value, LibraryError> {
        match self.data_type.element_type() {
            Some(element) if self.allows_array_coercion && !self.fed_by_array() => {
                self.fetch_array_values(element, source)
            }
            _ => self.fetch_value(source),
        }
    }

    /// The single connected value, else the default, else the type default.
    pub fn fetch_value(&self, source: &dyn ValueSource) -> Result<Value, LibraryError> {
        let raw = match self.connections.first() {
            Some(connection) => self.pull(connection, source)?,
            None => match &self.default {
                Some(value) => value.clone(),
                None => {
                    let fallback = self.data_type.default_value();
                    if fallback.is_null() {
                        return Err(LibraryError::MissingInput(self.title.clone()));
                    }
                    fallback
                }
            },
        };
        raw.coerce_to(&self.data_type)
    }

    /// Packs every connected value, in connection order, into an array.
    pub fn fetch_array_values(
        &self,
        element: &ValueType,
        source: &dyn ValueSource,
    ) -> Result<Value, LibraryError> {
        if self.connections.is_empty() {
            return self.fetch_value(source);
        }
        self.connections
            .iter()
            .map(|c| self.pull(c, source).and_then(|v| v.coerce_to(element)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputPin {
    pub title: String,
    pub data_type: ValueType,
}

impl OutputPin {
    pub fn for_type(data_type: &ValueType, title: Option<&str>) -> Self {
        let title = title
            .or_else(|| preferred_output_title(data_type))
            .unwrap_or("Result");
        Self {
            title: title.to_string(),
            data_type: data_type.clone(),
        }
    }
}

/// Friendly default title for an unnamed output.
pub fn preferred_output_title(data_type: &ValueType) -> Option<&'static str> {
    match data_type {
        ValueType::Boolean => Some("Truth"),
        ValueType::String => Some("Value"),
        t if t.is_floating_point() => Some("Number"),
        ValueType::DateTime => Some("Date"),
        ValueType::Table | ValueType::Column => Some("Data"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(values: &[(usize, Value)]) -> (Uuid, HashMap<PinRef, Value>) {
        let node = Uuid::new_v4();
        let map = values
            .iter()
            .map(|(pin, value)| (PinRef::new(node, *pin), value.clone()))
            .collect();
        (node, map)
    }

    #[test]
    fn test_pin_kinds_and_titles() {
        let pin = InputPin::for_type(&ValueType::optional(ValueType::I32), None, None);
        assert_eq!(pin.kind, PinKind::Number(NumericKind::I32));
        assert_eq!(pin.title, "Number");
        assert_eq!(pin.data_type, ValueType::I32);

        let pin = InputPin::for_type(&ValueType::Table, None, Some("Grid"));
        assert_eq!(pin.kind, PinKind::Generic);
        assert_eq!(pin.title, "Grid");

        let pin = InputPin::for_type(&ValueType::array_of(ValueType::F64), None, None);
        assert!(pin.allows_array_coercion);
        assert_eq!(pin.title, "Input");
    }

    #[test]
    fn test_optional_without_value_gets_type_default() {
        let pin = InputPin::for_type(&ValueType::optional(ValueType::I32), None, None);
        let empty: HashMap<PinRef, Value> = HashMap::new();
        assert_eq!(pin.resolve(&empty).unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_single_connection_replaces() {
        let (node, source) = upstream(&[(0, Value::from("a")), (1, Value::from("b"))]);
        let mut pin = InputPin::for_type(&ValueType::String, None, None);
        pin.connect(Connection::new(PinRef::new(node, 0), ValueType::String));
        pin.connect(Connection::new(PinRef::new(node, 1), ValueType::String));
        assert_eq!(pin.connections().len(), 1);
        assert_eq!(pin.resolve(&source).unwrap(), Value::from("b"));
    }

    #[test]
    fn test_array_packing_and_passthrough() {
        let (node, source) = upstream(&[
            (0, Value::Integer(1)),
            (1, Value::Integer(2)),
            (2, Value::from(vec![4.0, 5.0])),
        ]);
        let array = ValueType::array_of(ValueType::F64);

        let mut packed = InputPin::for_type(&array, None, None);
        packed.connect(Connection::new(PinRef::new(node, 0), ValueType::I64));
        packed.connect(Connection::new(PinRef::new(node, 1), ValueType::I64));
        assert_eq!(packed.resolve(&source).unwrap(), Value::from(vec![1.0, 2.0]));

        let mut direct = InputPin::for_type(&array, None, None);
        direct.connect(Connection::new(PinRef::new(node, 2), array.clone()));
        assert_eq!(direct.resolve(&source).unwrap(), Value::from(vec![4.0, 5.0]));
    }

    #[test]
    fn test_generic_pin_requires_value() {
        let pin = InputPin::for_type(&ValueType::object("demo.Thing"), None, None);
        assert!(pin.requires_auto_connection());
        let empty: HashMap<PinRef, Value> = HashMap::new();
        assert!(matches!(pin.resolve(&empty), Err(LibraryError::MissingInput(_))));
    }

    #[test]
    fn test_output_titles() {
        assert_eq!(OutputPin::for_type(&ValueType::Boolean, None).title, "Truth");
        assert_eq!(OutputPin::for_type(&ValueType::F64, None).title, "Number");
        assert_eq!(OutputPin::for_type(&ValueType::I32, None).title, "Result");
        assert_eq!(OutputPin::for_type(&ValueType::Column, None).title, "Data");
        assert_eq!(OutputPin::for_type(&ValueType::String, Some("Joined")).title, "Joined");
    }
}
