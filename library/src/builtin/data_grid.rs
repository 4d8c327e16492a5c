//! The data grid type: construction, inspection and CSV import.

use crate::builtin::{param, table, text};
use crate::error::LibraryError;
use crate::model::{DataColumn, DataGrid, Value, ValueType};
use crate::plugin::{MethodExport, TypeExport};

fn grid(receiver: &Value) -> Result<&DataGrid, LibraryError> {
    table(std::slice::from_ref(receiver), 0)
}

/// Parses comma separated text; the first line holds the headers.
/// Numeric cells become numbers, everything else stays text.
pub fn parse_csv(source: &str) -> Result<DataGrid, LibraryError> {
    let mut lines = source.lines().filter(|l| !l.trim().is_empty());
    let headers: Vec<&str> = match lines.next() {
        Some(line) => line.split(',').map(str::trim).collect(),
        None => return Ok(DataGrid::new()),
    };
    let mut columns: Vec<DataColumn> = headers.iter().map(|h| DataColumn::new(*h, Vec::new())).collect();

    for (row, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != columns.len() {
            return Err(LibraryError::InvalidArgument(format!(
                "row {} has {} cells, expected {}",
                row + 1,
                cells.len(),
                columns.len()
            )));
        }
        for (column, cell) in columns.iter_mut().zip(cells) {
            let value = cell
                .parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(cell));
            column.values.push(value);
        }
    }

    let mut grid = DataGrid::new();
    for column in columns {
        grid.add_column(column);
    }
    Ok(grid)
}

pub fn data_grid_type() -> TypeExport {
    use ValueType as VT;

    TypeExport::new("Standard.DataGrid")
        .with_value_type(VT::Table)
        .with_constructor(MethodExport::constructor(vec![], |_| Ok(Value::Table(DataGrid::new()))))
        .with_method(MethodExport::method(
            "Add Column",
            vec![param("Header", VT::String), param("Values", VT::array_of(VT::Any))],
            vec![VT::Table],
            |receiver, args| {
                let mut updated = grid(receiver)?.clone();
                let values = args
                    .get(1)
                    .and_then(Value::as_array)
                    .map(<[Value]>::to_vec)
                    .unwrap_or_default();
                updated.add_column(DataColumn::new(text(args, 0)?, values));
                Ok(vec![Value::Table(updated)])
            },
        ))
        .with_method(MethodExport::method(
            "Column",
            vec![param("Header", VT::String)],
            vec![VT::Column],
            |receiver, args| {
                let header = text(args, 0)?;
                let column = grid(receiver)?.column(header).cloned().ok_or_else(|| {
                    LibraryError::InvalidArgument(format!("no column named `{}`", header))
                })?;
                Ok(vec![Value::Column(column)])
            },
        ))
        .with_method(
            MethodExport::method("Size", vec![], vec![VT::I32, VT::I32], |receiver, _| {
                let grid = grid(receiver)?;
                Ok(vec![
                    Value::from(grid.column_count() as i64),
                    Value::from(grid.row_count() as i64),
                ])
            })
            .with_return_names(&["Columns", "Rows"]),
        )
        .with_method(MethodExport::function(
            "Parse CSV",
            vec![param("Text", VT::String)],
            vec![VT::Table],
            |args| Ok(vec![Value::Table(parse_csv(text(args, 0)?)?)]),
        ))
        .with_method(
            MethodExport::method("ToString", vec![], vec![VT::String], |receiver, _| {
                Ok(vec![Value::from(receiver.to_string())])
            })
            .declared_by("Object"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let grid = parse_csv("name, score\nada, 3\nbob, 4.5\n").unwrap();
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column("score").unwrap().values, vec![Value::from(3.0), Value::from(4.5)]);
        assert_eq!(grid.column("name").unwrap().values[0], Value::from("ada"));
        assert!(parse_csv("a,b\n1\n").is_err());
    }

    #[test]
    fn test_members_in_listing_order() {
        let ty = data_grid_type();
        assert_eq!(ty.public_constructors().len(), 1);
        let instance: Vec<_> = ty.instance_methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(instance, vec!["Add Column", "Column", "Size"]);
        let statics: Vec<_> = ty.static_methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(statics, vec!["Parse CSV"]);
    }
}
