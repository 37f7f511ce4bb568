//! Materialized query results shared between sessions and the reader
//! subsystem.

mod row;
mod row_set;

pub use row::Row;
pub use row_set::RowSet;
