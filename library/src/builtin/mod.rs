//! Toolboxes compiled into the library.

pub mod basic;
pub mod data_grid;
pub mod date;
pub mod generator;
pub mod logic;
pub mod math;
pub mod strings;
pub mod vector;

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::error::LibraryError;
use crate::model::{DataGrid, Value, ValueType};
use crate::plugin::{ExtensionModule, ParameterInfo, ToolboxDefinition, TypeExport};

pub use basic::BasicToolbox;
pub use generator::GeneratorModule;
pub use vector::VectorModule;

/// Extension modules registered like packages, under these toolbox names.
pub fn builtin_modules() -> Vec<(&'static str, Arc<dyn ExtensionModule>)> {
    vec![
        ("Generator", Arc::new(GeneratorModule) as Arc<dyn ExtensionModule>),
        ("Vector", Arc::new(VectorModule) as Arc<dyn ExtensionModule>),
    ]
}

/// Toolboxes that belong to the host front-end.
pub fn frontend_toolboxes() -> Vec<(&'static str, Box<dyn ToolboxDefinition>)> {
    vec![("Basic", Box::new(BasicToolbox) as Box<dyn ToolboxDefinition>)]
}

/// Standard types, in registration order. Types sharing a toolbox are
/// separated by a divider.
pub fn builtin_types() -> Vec<(&'static str, TypeExport)> {
    vec![
        ("Data Grid", data_grid::data_grid_type()),
        ("Math", math::calculator_type()),
        ("String Processing", strings::string_routines_type()),
        ("Boolean Logic", logic::boolean_routines_type()),
        ("Boolean Logic", logic::logic_routines_type()),
        ("Date", date::date_routines_type()),
    ]
}

/// Helper: shorthand for a parameter.
pub(crate) fn param(name: &str, value_type: ValueType) -> ParameterInfo {
    ParameterInfo::new(name, value_type)
}

fn arg<'a>(args: &'a [Value], index: usize) -> Result<&'a Value, LibraryError> {
    args.get(index)
        .ok_or_else(|| LibraryError::InvalidArgument(format!("missing argument {}", index)))
}

fn mismatch(args: &[Value], index: usize, expected: &str) -> LibraryError {
    LibraryError::InvalidArgument(format!(
        "argument {} is {}, expected {}",
        index,
        args.get(index).map(Value::to_string).unwrap_or_default(),
        expected
    ))
}

pub(crate) fn number(args: &[Value], index: usize) -> Result<f64, LibraryError> {
    arg(args, index)?
        .as_f64()
        .ok_or_else(|| mismatch(args, index, "a number"))
}

pub(crate) fn integer(args: &[Value], index: usize) -> Result<i64, LibraryError> {
    arg(args, index)?
        .as_i64()
        .ok_or_else(|| mismatch(args, index, "an integer"))
}

pub(crate) fn boolean(args: &[Value], index: usize) -> Result<bool, LibraryError> {
    arg(args, index)?
        .as_bool()
        .ok_or_else(|| mismatch(args, index, "a boolean"))
}

pub(crate) fn text(args: &[Value], index: usize) -> Result<&str, LibraryError> {
    arg(args, index)?
        .as_str()
        .ok_or_else(|| mismatch(args, index, "text"))
}

pub(crate) fn datetime(args: &[Value], index: usize) -> Result<NaiveDateTime, LibraryError> {
    arg(args, index)?
        .as_datetime()
        .ok_or_else(|| mismatch(args, index, "a date"))
}

pub(crate) fn table(args: &[Value], index: usize) -> Result<&DataGrid, LibraryError> {
    arg(args, index)?
        .as_table()
        .ok_or_else(|| mismatch(args, index, "a data grid"))
}

pub(crate) fn numbers(args: &[Value], index: usize) -> Result<Vec<f64>, LibraryError> {
    arg(args, index)?
        .as_array()
        .ok_or_else(|| mismatch(args, index, "an array"))?
        .iter()
        .map(|v| v.as_f64().ok_or_else(|| mismatch(args, index, "an array of numbers")))
        .collect()
}

pub(crate) fn booleans(args: &[Value], index: usize) -> Result<Vec<bool>, LibraryError> {
    arg(args, index)?
        .as_array()
        .ok_or_else(|| mismatch(args, index, "an array"))?
        .iter()
        .map(|v| v.as_bool().ok_or_else(|| mismatch(args, index, "an array of booleans")))
        .collect()
}

pub(crate) fn texts(args: &[Value], index: usize) -> Result<Vec<String>, LibraryError> {
    let values = arg(args, index)?
        .as_array()
        .ok_or_else(|| mismatch(args, index, "an array"))?;
    Ok(values.iter().map(Value::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_helpers() {
        let args = vec![
            Value::from(2.5),
            Value::from(3),
            Value::from("abc"),
            Value::from(vec![1.0, 2.0]),
        ];
        assert_eq!(number(&args, 0).unwrap(), 2.5);
        assert_eq!(number(&args, 1).unwrap(), 3.0);
        assert_eq!(integer(&args, 1).unwrap(), 3);
        assert_eq!(text(&args, 2).unwrap(), "abc");
        assert_eq!(numbers(&args, 3).unwrap(), vec![1.0, 2.0]);
        assert!(integer(&args, 0).is_err());
        assert!(boolean(&args, 9).is_err());
    }

    #[test]
    fn test_builtin_toolbox_names_are_distinct() {
        let modules: Vec<_> = builtin_modules().into_iter().map(|(n, _)| n).collect();
        for (name, _) in frontend_toolboxes() {
            assert!(!modules.contains(&name));
        }
    }
}
