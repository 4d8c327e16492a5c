use crate::builtin::{integer, number, param};
use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::plugin::{MethodExport, TypeExport};

fn binary(name: &str, f: fn(f64, f64) -> Result<f64, LibraryError>) -> MethodExport {
    MethodExport::function(
        name,
        vec![param("A", ValueType::F64), param("B", ValueType::F64)],
        vec![ValueType::F64],
        move |args| Ok(vec![Value::from(f(number(args, 0)?, number(args, 1)?)?)]),
    )
}

fn divide(a: f64, b: f64) -> Result<f64, LibraryError> {
    if b == 0.0 {
        return Err(LibraryError::InvalidArgument("division by zero".to_string()));
    }
    Ok(a / b)
}

pub fn calculator_type() -> TypeExport {
    use ValueType as VT;

    TypeExport::new("Standard.Calculator")
        .with_method(binary("Add", |a, b| Ok(a + b)))
        .with_method(binary("Subtract", |a, b| Ok(a - b)))
        .with_method(binary("Multiply", |a, b| Ok(a * b)))
        .with_method(binary("Divide", divide))
        .with_method(binary("Modulo", |a, b| divide(a, b).map(|_| a % b)))
        .with_method(binary("Power", |a, b| Ok(a.powf(b))))
        .with_method(MethodExport::function(
            "Sqrt",
            vec![param("Value", VT::F64)],
            vec![VT::F64],
            |args| {
                let value = number(args, 0)?;
                if value < 0.0 {
                    return Err(LibraryError::InvalidArgument(format!(
                        "cannot take the square root of {}",
                        value
                    )));
                }
                Ok(vec![Value::from(value.sqrt())])
            },
        ))
        .with_method(MethodExport::function(
            "Round",
            vec![param("Value", VT::F64), param("Digits", VT::I32).with_default(0)],
            vec![VT::F64],
            |args| {
                let digits = integer(args, 1)?.clamp(0, 15) as i32;
                let scale = 10f64.powi(digits);
                Ok(vec![Value::from((number(args, 0)? * scale).round() / scale)])
            },
        ))
        .with_method(MethodExport::function(
            "Clamp",
            vec![param("Value", VT::F64), param("Min", VT::F64), param("Max", VT::F64)],
            vec![VT::F64],
            |args| {
                let (value, min, max) = (number(args, 0)?, number(args, 1)?, number(args, 2)?);
                if min > max {
                    return Err(LibraryError::InvalidArgument(format!("min {} exceeds max {}", min, max)));
                }
                Ok(vec![Value::from(value.clamp(min, max))])
            },
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Vec<Value>, LibraryError> {
        let ty = calculator_type();
        let method = ty.methods.iter().find(|m| m.name == name).unwrap();
        method.invoker.call(args)
    }

    #[test]
    fn test_calculator() {
        assert_eq!(call("Add", &[1.5.into(), 2.0.into()]).unwrap(), vec![Value::from(3.5)]);
        assert_eq!(call("Round", &[2.345.into(), 1.into()]).unwrap(), vec![Value::from(2.3)]);
        assert!(call("Divide", &[1.0.into(), 0.0.into()]).is_err());
        assert!(call("Sqrt", &[(-1.0).into()]).is_err());
    }
}
