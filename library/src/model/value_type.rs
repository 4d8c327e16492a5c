//! Host types understood by the node layer.
//!
//! Extensions describe their parameters and results with these; nothing
//! outside this list is introspected at run time.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::color::Color;
use crate::model::data_grid::{DataColumn, DataGrid};
use crate::model::value::Value;

/// Width and signedness of a numeric host type.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumericKind {
    pub fn is_float(self) -> bool {
        matches!(self, NumericKind::F32 | NumericKind::F64)
    }

    /// Inclusive integer range, `None` for floating point kinds.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            NumericKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            NumericKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            NumericKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            NumericKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            NumericKind::U8 => (0, u8::MAX as i128),
            NumericKind::U16 => (0, u16::MAX as i128),
            NumericKind::U32 => (0, u32::MAX as i128),
            // Values travel as i64, so u64 is capped there.
            NumericKind::U64 => (0, i64::MAX as i128),
            NumericKind::F32 | NumericKind::F64 => return None,
        };
        Some(range)
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericKind::I8 => "i8",
            NumericKind::I16 => "i16",
            NumericKind::I32 => "i32",
            NumericKind::I64 => "i64",
            NumericKind::U8 => "u8",
            NumericKind::U16 => "u16",
            NumericKind::U32 => "u32",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
        }
    }
}

/// Declared type of a parameter or a return value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    String,
    Numeric(NumericKind),
    DateTime,
    Color,
    /// Tabular data
    Table,
    /// A single column of tabular data
    Column,
    Array(Box<ValueType>),
    /// A value that may be absent
    Optional(Box<ValueType>),
    /// Opaque host type, identified by its full name
    Object(String),
    Any,
}

impl ValueType {
    pub const F64: ValueType = ValueType::Numeric(NumericKind::F64);
    pub const I32: ValueType = ValueType::Numeric(NumericKind::I32);
    pub const I64: ValueType = ValueType::Numeric(NumericKind::I64);

    pub fn array_of(element: ValueType) -> Self {
        ValueType::Array(Box::new(element))
    }

    pub fn optional(inner: ValueType) -> Self {
        ValueType::Optional(Box::new(inner))
    }

    pub fn object(full_name: impl Into<String>) -> Self {
        ValueType::Object(full_name.into())
    }

    /// Strips exactly one level of `Optional`.
    pub fn unwrap_optional(&self) -> &ValueType {
        match self {
            ValueType::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, ValueType::Optional(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    pub fn element_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, ValueType::Numeric(kind) if kind.is_float())
    }

    /// Name used in resource identifiers and documentation signatures.
    pub fn type_name(&self) -> String {
        match self {
            ValueType::Boolean => "bool".to_string(),
            ValueType::String => "string".to_string(),
            ValueType::Numeric(kind) => kind.name().to_string(),
            ValueType::DateTime => "datetime".to_string(),
            ValueType::Color => "color".to_string(),
            ValueType::Table => "DataGrid".to_string(),
            ValueType::Column => "DataColumn".to_string(),
            ValueType::Array(element) => format!("{}[]", element.type_name()),
            ValueType::Optional(inner) => format!("{}?", inner.type_name()),
            ValueType::Object(name) => name.clone(),
            ValueType::Any => "any".to_string(),
        }
    }

    /// The value a parameter of this type takes when nothing else is known.
    pub fn default_value(&self) -> Value {
        match self {
            ValueType::Boolean => Value::Boolean(false),
            ValueType::String => Value::String(String::new()),
            ValueType::Numeric(kind) if kind.is_float() => Value::from(0.0),
            ValueType::Numeric(_) => Value::Integer(0),
            ValueType::DateTime => Value::DateTime(NaiveDateTime::default()),
            ValueType::Color => Value::Color(Color::default()),
            ValueType::Table => Value::Table(DataGrid::default()),
            ValueType::Column => Value::Column(DataColumn::default()),
            ValueType::Array(_) => Value::Array(Vec::new()),
            ValueType::Optional(inner) => inner.default_value(),
            ValueType::Object(_) | ValueType::Any => Value::Null,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}
