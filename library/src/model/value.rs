use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;

use crate::error::LibraryError;
use crate::model::color::Color;
use crate::model::data_grid::{DataColumn, DataGrid};
use crate::model::value_type::{NumericKind, ValueType};

/// Shared handle to an opaque host object.
#[derive(Clone)]
pub struct ObjectRef {
    type_name: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<String>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A value flowing through pins and into callables.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Number(OrderedFloat<f64>),
    String(String),
    DateTime(NaiveDateTime),
    Color(Color),
    Array(Vec<Value>),
    Table(DataGrid),
    Column(DataColumn),
    Object(ObjectRef),
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(OrderedFloat(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(OrderedFloat(value as f64))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DataGrid> for Value {
    fn from(value: DataGrid) -> Self {
        Value::Table(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.into_inner()),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&DataGrid> {
        match self {
            Value::Table(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short form used in error messages; text is quoted.
    fn describe(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s),
            other => other.to_string(),
        }
    }

    /// Converts `self` into the representation expected for `target`.
    pub fn coerce_to(self, target: &ValueType) -> Result<Value, LibraryError> {
        match target {
            ValueType::Any => Ok(self),
            ValueType::Optional(inner) => match self {
                Value::Null => Ok(Value::Null),
                other => other.coerce_to(inner),
            },
            ValueType::Numeric(kind) => coerce_numeric(self, *kind),
            ValueType::Boolean => match self {
                Value::Boolean(_) => Ok(self),
                Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Boolean(true)),
                    "false" => Ok(Value::Boolean(false)),
                    _ => Err(LibraryError::coercion(self.describe(), target)),
                },
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::String => match self {
                Value::String(_) => Ok(self),
                Value::Boolean(_)
                | Value::Integer(_)
                | Value::Number(_)
                | Value::DateTime(_)
                | Value::Color(_) => Ok(Value::String(self.to_string())),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::DateTime => match self {
                Value::DateTime(_) => Ok(self),
                Value::String(ref s) => parse_datetime(s)
                    .map(Value::DateTime)
                    .ok_or_else(|| LibraryError::coercion(self.describe(), target)),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::Color => match self {
                Value::Color(_) => Ok(self),
                Value::String(ref s) => Color::from_hex(s).map(Value::Color),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::Table => match self {
                Value::Table(_) => Ok(self),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::Column => match self {
                Value::Column(_) => Ok(self),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::Array(element) => match self {
                Value::Array(values) => values
                    .into_iter()
                    .map(|v| v.coerce_to(element))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
            ValueType::Object(name) => match self {
                Value::Object(ref object) if object.type_name() == name => Ok(self),
                other => Err(LibraryError::coercion(other.describe(), target)),
            },
        }
    }
}

fn coerce_numeric(value: Value, kind: NumericKind) -> Result<Value, LibraryError> {
    let target = ValueType::Numeric(kind);
    match value {
        Value::Integer(i) => integer_to_kind(i as i128, kind)
            .ok_or_else(|| LibraryError::coercion(i, &target)),
        Value::Number(n) => {
            let n = n.into_inner();
            if kind.is_float() {
                let n = if kind == NumericKind::F32 { n as f32 as f64 } else { n };
                Ok(Value::from(n))
            } else if n.is_finite() && n.fract() == 0.0 {
                integer_to_kind(n as i128, kind).ok_or_else(|| LibraryError::coercion(n, &target))
            } else {
                Err(LibraryError::coercion(n, &target))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                coerce_numeric(Value::Integer(i), kind)
            } else if let Ok(n) = trimmed.parse::<f64>() {
                coerce_numeric(Value::from(n), kind)
            } else {
                Err(LibraryError::coercion(format!("\"{}\"", s), &target))
            }
        }
        other => Err(LibraryError::coercion(other.describe(), &target)),
    }
}

fn integer_to_kind(i: i128, kind: NumericKind) -> Option<Value> {
    match kind.integer_range() {
        None => Some(Value::from(i as f64)),
        Some((min, max)) if (min..=max).contains(&i) => Some(Value::Integer(i as i64)),
        Some(_) => None,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Color(c) => write!(f, "{}", c),
            Value::Array(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Value::Table(grid) => write!(f, "{}", grid),
            Value::Column(column) => write!(f, "DataColumn({}, {} values)", column.header, column.len()),
            Value::Object(object) => write!(f, "<{}>", object.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_accepts_integer_and_float() {
        assert_eq!(Value::Integer(3).coerce_to(&ValueType::F64).unwrap(), Value::from(3.0));
        assert_eq!(Value::from(3.0).coerce_to(&ValueType::F64).unwrap(), Value::from(3.0));
        assert_eq!(Value::from(3.0).coerce_to(&ValueType::I32).unwrap(), Value::Integer(3));
        assert_eq!(Value::Integer(3).coerce_to(&ValueType::I32).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_numeric_rejects_text_and_fractions() {
        let err = Value::from("abc").coerce_to(&ValueType::F64).unwrap_err();
        assert!(matches!(err, LibraryError::Coercion { .. }));
        assert!(err.to_string().contains("\"abc\""));

        assert!(Value::from(3.5).coerce_to(&ValueType::I32).is_err());
        assert!(Value::Integer(300).coerce_to(&ValueType::Numeric(NumericKind::U8)).is_err());
        assert_eq!(Value::from(" 42 ").coerce_to(&ValueType::I64).unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_optional_and_array() {
        let optional = ValueType::optional(ValueType::I32);
        assert_eq!(Value::Null.coerce_to(&optional).unwrap(), Value::Null);
        assert_eq!(Value::from(2.0).coerce_to(&optional).unwrap(), Value::Integer(2));

        let array = ValueType::array_of(ValueType::F64);
        let coerced = Value::from(vec![1i64, 2, 3]).coerce_to(&array).unwrap();
        assert_eq!(coerced, Value::from(vec![1.0, 2.0, 3.0]));
        assert!(Value::Integer(1).coerce_to(&array).is_err());
    }

    #[test]
    fn test_text_conversions() {
        assert_eq!(
            Value::from("#FF000080").coerce_to(&ValueType::Color).unwrap(),
            Value::Color(Color::rgba(255, 0, 0, 128))
        );
        let date = Value::from("2024-02-29").coerce_to(&ValueType::DateTime).unwrap();
        assert_eq!(date.to_string(), "2024-02-29 00:00:00");
        assert_eq!(Value::from("TRUE").coerce_to(&ValueType::Boolean).unwrap(), Value::Boolean(true));
        assert_eq!(Value::Integer(7).coerce_to(&ValueType::String).unwrap(), Value::from("7"));
    }

    #[test]
    fn test_object_type_must_match() {
        let object = Value::Object(ObjectRef::new("demo.Point", (1, 2)));
        assert!(object.clone().coerce_to(&ValueType::object("demo.Point")).is_ok());
        assert!(object.coerce_to(&ValueType::object("demo.Other")).is_err());
    }
}
