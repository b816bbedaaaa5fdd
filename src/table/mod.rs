//! Data tables
//!
//! A `DataTable` maps canonical `RowName`s to row instances of one record
//! type, governed by a `TablePolicy`.

mod data_table;
mod policy;
mod row_name;

pub use data_table::DataTable;
pub use policy::{TablePolicy, DEFAULT_KEY_FIELD};
pub use row_name::RowName;
