use crate::builtin::{param, text, texts};
use crate::model::{Value, ValueType};
use crate::plugin::{MethodExport, TypeExport};

fn unary(name: &str, f: fn(&str) -> String) -> MethodExport {
    MethodExport::function(name, vec![param("Text", ValueType::String)], vec![ValueType::String], move |args| {
        Ok(vec![Value::from(f(text(args, 0)?))])
    })
}

pub fn string_routines_type() -> TypeExport {
    use ValueType as VT;

    TypeExport::new("Standard.StringRoutines")
        .abstract_type()
        .with_method(MethodExport::function(
            "Concat",
            vec![param("A", VT::String), param("B", VT::String)],
            vec![VT::String],
            |args| Ok(vec![Value::from(format!("{}{}", text(args, 0)?, text(args, 1)?))]),
        ))
        .with_method(MethodExport::function(
            "Join",
            vec![param("Parts", VT::array_of(VT::String)), param("Separator", VT::String).with_default(", ")],
            vec![VT::String],
            |args| Ok(vec![Value::from(texts(args, 0)?.join(text(args, 1)?))]),
        ))
        .with_method(MethodExport::function(
            "Split",
            vec![param("Text", VT::String), param("Separator", VT::String).with_default(",")],
            vec![VT::array_of(VT::String)],
            |args| {
                let separator = text(args, 1)?;
                let parts: Vec<Value> = if separator.is_empty() {
                    text(args, 0)?.chars().map(|c| Value::from(c.to_string())).collect()
                } else {
                    text(args, 0)?.split(separator).map(Value::from).collect()
                };
                Ok(vec![Value::Array(parts)])
            },
        ))
        .with_method(MethodExport::function(
            "Length",
            vec![param("Text", VT::String)],
            vec![VT::I32],
            |args| Ok(vec![Value::from(text(args, 0)?.chars().count() as i64)]),
        ))
        .with_method(MethodExport::function(
            "Replace",
            vec![param("Text", VT::String), param("Pattern", VT::String), param("Replacement", VT::String)],
            vec![VT::String],
            |args| Ok(vec![Value::from(text(args, 0)?.replace(text(args, 1)?, text(args, 2)?))]),
        ))
        .with_method(MethodExport::function(
            "Contains",
            vec![param("Text", VT::String), param("Part", VT::String)],
            vec![VT::Boolean],
            |args| Ok(vec![Value::from(text(args, 0)?.contains(text(args, 1)?))]),
        ))
        .with_method(unary("Upper", str::to_uppercase))
        .with_method(unary("Lower", str::to_lowercase))
        .with_method(unary("Trim", |s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(ty: &TypeExport, name: &str, args: &[Value]) -> Vec<Value> {
        let method = ty.methods.iter().find(|m| m.name == name).unwrap();
        method.invoker.call(args).unwrap()
    }

    #[test]
    fn test_string_routines() {
        let ty = string_routines_type();
        assert_eq!(call(&ty, "Concat", &["ab".into(), "cd".into()]), vec![Value::from("abcd")]);
        assert_eq!(
            call(&ty, "Join", &[Value::from(vec!["a", "b"]), ", ".into()]),
            vec![Value::from("a, b")]
        );
        assert_eq!(call(&ty, "Length", &["héllo".into()]), vec![Value::Integer(5)]);
        assert_eq!(call(&ty, "Upper", &["abc".into()]), vec![Value::from("ABC")]);
        assert_eq!(
            call(&ty, "Split", &["a,b".into(), ",".into()]),
            vec![Value::from(vec!["a", "b"])]
        );
    }
}
