//! Sequence generators. Published through an explicit toolbox definition.

use chrono::Utc;

use crate::builtin::{integer, number, text};
use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::plugin::{CallableDescriptor, ExtensionModule, ToolboxDefinition, ToolboxEntry};

const DECLARING_TYPE: &str = "Generator.Sequences";

/// Largest sequence a generator will produce.
const MAX_LENGTH: usize = 1_000_000;

pub struct GeneratorModule;

impl ExtensionModule for GeneratorModule {
    fn toolbox_definitions(&self) -> Vec<Box<dyn ToolboxDefinition>> {
        vec![Box::new(GeneratorToolbox) as Box<dyn ToolboxDefinition>]
    }
}

pub struct GeneratorToolbox;

impl ToolboxDefinition for GeneratorToolbox {
    fn export_nodes(&self) -> Vec<ToolboxEntry> {
        use ValueType as VT;

        vec![
            // ==================== Numbers ====================
            ToolboxEntry::callable(
                CallableDescriptor::function(
                    DECLARING_TYPE,
                    "Range",
                    vec![VT::F64, VT::F64, VT::F64],
                    vec![VT::array_of(VT::F64)],
                    range,
                )
                .with_input_names(&["Start", "Stop", "Step"])
                .with_defaults(vec![Some(Value::from(0.0)), Some(Value::from(10.0)), Some(Value::from(1.0))])
                .with_tooltip("Numbers from start (inclusive) to stop (exclusive)."),
            ),
            ToolboxEntry::callable(
                CallableDescriptor::function(
                    DECLARING_TYPE,
                    "Linspace",
                    vec![VT::F64, VT::F64, VT::I32],
                    vec![VT::array_of(VT::F64)],
                    linspace,
                )
                .with_input_names(&["Start", "Stop", "Count"])
                .with_tooltip("Evenly spaced numbers over a closed interval."),
            ),
            ToolboxEntry::Divider,
            // ==================== Text ====================
            ToolboxEntry::callable(
                CallableDescriptor::function(
                    DECLARING_TYPE,
                    "Repeat Text",
                    vec![VT::String, VT::I32],
                    vec![VT::array_of(VT::String)],
                    repeat_text,
                )
                .with_input_names(&["Text", "Count"]),
            ),
            ToolboxEntry::Divider,
            // ==================== Time ====================
            ToolboxEntry::callable(
                CallableDescriptor::function(DECLARING_TYPE, "Now", vec![], vec![VT::DateTime], |_| {
                    Ok(vec![Value::DateTime(Utc::now().naive_utc())])
                })
                .with_tooltip("Current UTC date and time."),
            ),
        ]
    }
}

fn checked_count(count: i64) -> Result<usize, LibraryError> {
    usize::try_from(count)
        .ok()
        .filter(|c| *c <= MAX_LENGTH)
        .ok_or_else(|| LibraryError::InvalidArgument(format!("count {} is out of range", count)))
}

fn range(args: &[Value]) -> Result<Vec<Value>, LibraryError> {
    let (start, stop, step) = (number(args, 0)?, number(args, 1)?, number(args, 2)?);
    if step == 0.0 || !step.is_finite() {
        return Err(LibraryError::InvalidArgument("step must be a non-zero number".to_string()));
    }
    let length = ((stop - start) / step).ceil().max(0.0);
    if length > MAX_LENGTH as f64 {
        return Err(LibraryError::InvalidArgument(format!("range of {} values is too long", length)));
    }
    let values = (0..length as usize)
        .map(|i| Value::from(start + step * i as f64))
        .collect();
    Ok(vec![Value::Array(values)])
}

fn linspace(args: &[Value]) -> Result<Vec<Value>, LibraryError> {
    let (start, stop) = (number(args, 0)?, number(args, 1)?);
    let count = checked_count(integer(args, 2)?)?;
    let values = match count {
        0 => Vec::new(),
        1 => vec![Value::from(start)],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| Value::from(start + step * i as f64)).collect()
        }
    };
    Ok(vec![Value::Array(values)])
}

fn repeat_text(args: &[Value]) -> Result<Vec<Value>, LibraryError> {
    let value = text(args, 0)?;
    let count = checked_count(integer(args, 1)?)?;
    Ok(vec![Value::Array(vec![Value::from(value); count])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_and_linspace() {
        let out = range(&[Value::from(0.0), Value::from(3.0), Value::from(1.0)]).unwrap();
        assert_eq!(out[0], Value::from(vec![0.0, 1.0, 2.0]));

        let out = linspace(&[Value::from(0.0), Value::from(1.0), Value::from(3)]).unwrap();
        assert_eq!(out[0], Value::from(vec![0.0, 0.5, 1.0]));

        assert!(range(&[Value::from(0.0), Value::from(3.0), Value::from(0.0)]).is_err());
        assert!(linspace(&[Value::from(0.0), Value::from(1.0), Value::from(-1)]).is_err());
    }
}
