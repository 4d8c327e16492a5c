//! Vector arithmetic over number arrays. Published as plain exported types
//! and indexed by the catalog.

use crate::builtin::{number, numbers, param};
use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::plugin::{ExtensionModule, MethodExport, TypeExport};

pub struct VectorModule;

impl ExtensionModule for VectorModule {
    fn exported_types(&self) -> Vec<TypeExport> {
        vec![vector_math_type(), statistics_type()]
    }
}

fn array() -> ValueType {
    ValueType::array_of(ValueType::F64)
}

fn scalar(f: fn(&[f64]) -> Result<f64, LibraryError>) -> impl Fn(&[Value]) -> Result<Vec<Value>, LibraryError> {
    move |args| Ok(vec![Value::from(f(&numbers(args, 0)?)?)])
}

fn non_empty(values: &[f64]) -> Result<(), LibraryError> {
    if values.is_empty() {
        return Err(LibraryError::InvalidArgument("vector is empty".to_string()));
    }
    Ok(())
}

fn same_length(a: &[f64], b: &[f64]) -> Result<(), LibraryError> {
    if a.len() != b.len() {
        return Err(LibraryError::InvalidArgument(format!(
            "vectors differ in length ({} and {})",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

fn mean(values: &[f64]) -> Result<f64, LibraryError> {
    non_empty(values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn variance(values: &[f64]) -> Result<f64, LibraryError> {
    let m = mean(values)?;
    Ok(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

fn vector_math_type() -> TypeExport {
    TypeExport::new("Vector.VectorMath")
        .abstract_type()
        .with_method(MethodExport::function(
            "Sum",
            vec![param("Vector", array())],
            vec![ValueType::F64],
            scalar(|v| Ok(v.iter().sum())),
        ))
        .with_method(MethodExport::function(
            "Max",
            vec![param("Vector", array())],
            vec![ValueType::F64],
            scalar(|v| {
                non_empty(v)?;
                Ok(v.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }),
        ))
        .with_method(MethodExport::function(
            "Min",
            vec![param("Vector", array())],
            vec![ValueType::F64],
            scalar(|v| {
                non_empty(v)?;
                Ok(v.iter().copied().fold(f64::INFINITY, f64::min))
            }),
        ))
        .with_method(MethodExport::function(
            "Add",
            vec![param("A", array()), param("B", array())],
            vec![array()],
            |args| {
                let (a, b) = (numbers(args, 0)?, numbers(args, 1)?);
                same_length(&a, &b)?;
                Ok(vec![Value::from(
                    a.iter().zip(&b).map(|(x, y)| x + y).collect::<Vec<_>>(),
                )])
            },
        ))
        .with_method(MethodExport::function(
            "Dot",
            vec![param("A", array()), param("B", array())],
            vec![ValueType::F64],
            |args| {
                let (a, b) = (numbers(args, 0)?, numbers(args, 1)?);
                same_length(&a, &b)?;
                Ok(vec![Value::from(a.iter().zip(&b).map(|(x, y)| x * y).sum::<f64>())])
            },
        ))
        .with_method(MethodExport::function(
            "Scale",
            vec![param("Vector", array()), param("Factor", ValueType::F64).with_default(1.0)],
            vec![array()],
            |args| {
                let factor = number(args, 1)?;
                let scaled: Vec<f64> = numbers(args, 0)?.iter().map(|v| v * factor).collect();
                Ok(vec![Value::from(scaled)])
            },
        ))
        .with_method(
            MethodExport::function("Normalize", vec![param("Vector", array())], vec![array()], |args| {
                let v = numbers(args, 0)?;
                let length = v.iter().map(|x| x * x).sum::<f64>().sqrt();
                if length == 0.0 {
                    return Err(LibraryError::InvalidArgument("cannot normalize a zero vector".to_string()));
                }
                Ok(vec![Value::from(v.iter().map(|x| x / length).collect::<Vec<_>>())])
            })
            .internal(),
        )
}

fn statistics_type() -> TypeExport {
    TypeExport::new("Vector.Statistics")
        .with_method(MethodExport::function(
            "Mean",
            vec![param("Vector", array())],
            vec![ValueType::F64],
            scalar(mean),
        ))
        .with_method(MethodExport::function(
            "Variance",
            vec![param("Vector", array())],
            vec![ValueType::F64],
            scalar(variance),
        ))
        .with_method(
            MethodExport::function(
                "Summary",
                vec![param("Vector", array())],
                vec![ValueType::F64, ValueType::F64],
                |args| {
                    let v = numbers(args, 0)?;
                    Ok(vec![Value::from(mean(&v)?), Value::from(variance(&v)?.sqrt())])
                },
            )
            .with_return_names(&["Mean", "Deviation"]),
        )
        .with_method(
            MethodExport::function("ToString", vec![], vec![ValueType::String], |_| {
                Ok(vec![Value::from("Vector.Statistics")])
            })
            .declared_by("Object"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_statics_exclude_internal_and_base_members() {
        let math = vector_math_type();
        let names: Vec<_> = math.static_methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Add", "Dot", "Max", "Min", "Scale", "Sum"]);

        let stats = statistics_type();
        let names: Vec<_> = stats.static_methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Mean", "Summary", "Variance"]);
    }

    #[test]
    fn test_mean_and_variance() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
        assert!((variance(&[1.0, 2.0, 3.0]).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!(mean(&[]).is_err());
    }
}
