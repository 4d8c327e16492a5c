//! Minimal tabular data carried between nodes.

use std::fmt;

use crate::model::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataColumn {
    pub header: String,
    pub values: Vec<Value>,
}

impl DataColumn {
    pub fn new(header: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            header: header.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataGrid {
    pub columns: Vec<DataColumn>,
}

impl DataGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, column: DataColumn) {
        self.columns.push(column);
    }

    pub fn column(&self, header: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.header == header)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Length of the longest column.
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(DataColumn::len).max().unwrap_or(0)
    }
}

impl fmt::Display for DataGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataGrid({} columns x {} rows)",
            self.column_count(),
            self.row_count()
        )
    }
}
