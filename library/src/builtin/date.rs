use std::fmt::Write as _;

use chrono::{Datelike, Duration};

use crate::builtin::{datetime, integer, param, text};
use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::plugin::{MethodExport, TypeExport};

pub fn date_routines_type() -> TypeExport {
    use ValueType as VT;

    TypeExport::new("Standard.DateRoutines")
        .abstract_type()
        .with_method(MethodExport::function(
            "Parse",
            vec![param("Text", VT::String)],
            vec![VT::DateTime],
            |args| Ok(vec![Value::from(text(args, 0)?).coerce_to(&VT::DateTime)?]),
        ))
        .with_method(MethodExport::function(
            "Format",
            vec![param("Date", VT::DateTime), param("Pattern", VT::String).with_default("%Y-%m-%d")],
            vec![VT::String],
            |args| {
                let date = datetime(args, 0)?;
                let mut out = String::new();
                write!(out, "{}", date.format(text(args, 1)?)).map_err(|_| {
                    LibraryError::InvalidArgument(format!("invalid date pattern `{}`", text(args, 1).unwrap_or_default()))
                })?;
                Ok(vec![Value::from(out)])
            },
        ))
        .with_method(MethodExport::function(
            "Add Days",
            vec![param("Date", VT::DateTime), param("Days", VT::I32)],
            vec![VT::DateTime],
            |args| {
                let date = datetime(args, 0)?;
                let shifted = Duration::try_days(integer(args, 1)?)
                    .and_then(|days| date.checked_add_signed(days))
                    .ok_or_else(|| LibraryError::InvalidArgument("date out of range".to_string()))?;
                Ok(vec![Value::from(shifted)])
            },
        ))
        .with_method(MethodExport::function(
            "Days Between",
            vec![param("From", VT::DateTime), param("To", VT::DateTime)],
            vec![VT::I64],
            |args| {
                let days = (datetime(args, 1)? - datetime(args, 0)?).num_days();
                Ok(vec![Value::from(days)])
            },
        ))
        .with_method(
            MethodExport::function(
                "Components",
                vec![param("Date", VT::DateTime)],
                vec![VT::I32, VT::I32, VT::I32],
                |args| {
                    let date = datetime(args, 0)?;
                    Ok(vec![
                        Value::from(date.year()),
                        Value::from(date.month() as i64),
                        Value::from(date.day() as i64),
                    ])
                },
            )
            .with_return_names(&["Year", "Month", "Day"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Vec<Value> {
        let ty = date_routines_type();
        let method = ty.methods.iter().find(|m| m.name == name).unwrap();
        method.invoker.call(args).unwrap()
    }

    #[test]
    fn test_date_routines() {
        let date = call("Parse", &["2024-02-28".into()]).remove(0);
        let next = call("Add Days", &[date.clone(), 2.into()]).remove(0);
        assert_eq!(call("Format", &[next.clone(), "%Y-%m-%d".into()]), vec![Value::from("2024-03-01")]);
        assert_eq!(call("Days Between", &[date, next.clone()]), vec![Value::Integer(2)]);
        assert_eq!(
            call("Components", &[next]),
            vec![Value::Integer(2024), Value::Integer(3), Value::Integer(1)]
        );
    }
}
