use crate::builtin::{boolean, booleans, number, param};
use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::plugin::{MethodExport, TypeExport};

fn binary(name: &str, f: fn(bool, bool) -> bool) -> MethodExport {
    MethodExport::function(
        name,
        vec![param("A", ValueType::Boolean), param("B", ValueType::Boolean)],
        vec![ValueType::Boolean],
        move |args| Ok(vec![Value::from(f(boolean(args, 0)?, boolean(args, 1)?))]),
    )
}

fn comparison(name: &str, f: fn(f64, f64) -> bool) -> MethodExport {
    MethodExport::function(
        name,
        vec![param("A", ValueType::F64), param("B", ValueType::F64)],
        vec![ValueType::Boolean],
        move |args| Ok(vec![Value::from(f(number(args, 0)?, number(args, 1)?))]),
    )
}

fn arg(args: &[Value], index: usize) -> Result<Value, LibraryError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| LibraryError::InvalidArgument(format!("missing argument {}", index)))
}

pub fn boolean_routines_type() -> TypeExport {
    TypeExport::new("Standard.BooleanRoutines")
        .abstract_type()
        .with_method(binary("And", |a, b| a && b))
        .with_method(binary("Or", |a, b| a || b))
        .with_method(binary("Xor", |a, b| a ^ b))
        .with_method(MethodExport::function(
            "Not",
            vec![param("Value", ValueType::Boolean)],
            vec![ValueType::Boolean],
            |args| Ok(vec![Value::from(!boolean(args, 0)?)]),
        ))
        .with_method(MethodExport::function(
            "All",
            vec![param("Values", ValueType::array_of(ValueType::Boolean))],
            vec![ValueType::Boolean],
            |args| Ok(vec![Value::from(booleans(args, 0)?.into_iter().all(|b| b))]),
        ))
        .with_method(MethodExport::function(
            "Any",
            vec![param("Values", ValueType::array_of(ValueType::Boolean))],
            vec![ValueType::Boolean],
            |args| Ok(vec![Value::from(booleans(args, 0)?.into_iter().any(|b| b))]),
        ))
}

pub fn logic_routines_type() -> TypeExport {
    TypeExport::new("Standard.LogicRoutines")
        .abstract_type()
        .with_method(comparison("Greater", |a, b| a > b))
        .with_method(comparison("Less", |a, b| a < b))
        .with_method(MethodExport::function(
            "Equal",
            vec![param("A", ValueType::Any), param("B", ValueType::Any)],
            vec![ValueType::Boolean],
            |args| Ok(vec![Value::from(arg(args, 0)? == arg(args, 1)?)]),
        ))
        .with_method(
            MethodExport::function(
                "Choose",
                vec![
                    param("Condition", ValueType::Boolean),
                    param("Then", ValueType::Any),
                    param("Else", ValueType::Any),
                ],
                vec![ValueType::Any],
                |args| {
                    let index = if boolean(args, 0)? { 1 } else { 2 };
                    Ok(vec![arg(args, index)?])
                },
            )
            .with_return_names(&["Result"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_and_logic_routines() {
        let booleans = boolean_routines_type();
        let xor = booleans.methods.iter().find(|m| m.name == "Xor").unwrap();
        assert_eq!(xor.invoker.call(&[true.into(), true.into()]).unwrap(), vec![Value::from(false)]);

        let logic = logic_routines_type();
        let choose = logic.methods.iter().find(|m| m.name == "Choose").unwrap();
        let out = choose
            .invoker
            .call(&[false.into(), "yes".into(), "no".into()])
            .unwrap();
        assert_eq!(out, vec![Value::from("no")]);
    }
}
