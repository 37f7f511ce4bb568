use std::collections::HashMap;
use std::sync::Arc;

use super::row::Row;
use crate::types::RowValue;

/// One materialized result set: shared column names plus zero or more rows.
///
/// Sessions hand these to the engine fully read; multiple-result-set commands
/// receive one `RowSet` per configured result set, in cursor order.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    columns: Option<Arc<Vec<String>>>,
    index: Arc<HashMap<String, usize>>,
    rows: Vec<Row>,
}

impl RowSet {
    /// Create an empty result set with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let index = Arc::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        Self {
            columns: Some(Arc::new(columns)),
            index,
            rows: Vec::new(),
        }
    }

    /// Create a result set with the given columns and rows in one go.
    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<RowValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(columns);
        for row in rows {
            set.push_row(row);
        }
        set
    }

    /// Append a row of values. Values align positionally with the columns.
    pub fn push_row(&mut self, values: Vec<RowValue>) {
        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => return,
        };
        self.rows.push(Row {
            columns,
            values,
            index: self.index.clone(),
        });
    }

    /// The column names, if any row shape has been established.
    #[must_use]
    pub fn columns(&self) -> Option<&Arc<Vec<String>>> {
        self.columns.as_ref()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}
