use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValue;

/// A single row of a result set.
///
/// Column names and the name-to-index lookup are shared across every row of
/// the owning [`super::RowSet`] to avoid duplicating them per row.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) values: Vec<RowValue>,
    pub(crate) index: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Get the index of a column by name.
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.index.get(column_name) {
            return Some(idx);
        }
        // Fall back to linear search
        self.columns.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValue> {
        self.column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValue> {
        self.values.get(index)
    }

    /// The column names of this row.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
