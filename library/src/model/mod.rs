pub mod color;
pub mod data_grid;
pub mod value;
pub mod value_type;

pub use color::Color;
pub use data_grid::{DataColumn, DataGrid};
pub use value::{ObjectRef, Value};
pub use value_type::{NumericKind, ValueType};
