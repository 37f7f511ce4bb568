use crate::error::DataAccessError;
use crate::mapping::Record;
use crate::types::RowValue;

/// The direction of a parameter relative to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

/// The payload of a parameter: a scalar value or a table-valued argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar(RowValue),
    Table(TableValue),
}

impl ParameterValue {
    #[must_use]
    pub fn scalar(&self) -> Option<&RowValue> {
        match self {
            ParameterValue::Scalar(value) => Some(value),
            ParameterValue::Table(_) => None,
        }
    }
}

impl<T: Into<RowValue>> From<T> for ParameterValue {
    fn from(value: T) -> Self {
        ParameterValue::Scalar(value.into())
    }
}

/// Database-agnostic parameter information.
///
/// Parameters carry no driver knowledge; the driver-specific bound form is
/// created at the moment of execution. After execution, non-input parameters
/// are updated in place with the backend-reported values.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) value: ParameterValue,
    pub(crate) direction: ParameterDirection,
    pub(crate) size: Option<usize>,
    pub(crate) sql_type: Option<i32>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            direction: ParameterDirection::Input,
            size: None,
            sql_type: None,
        }
    }

    /// A table-valued parameter.
    pub fn table(name: impl Into<String>, table: TableValue) -> Self {
        Self::new(name, ParameterValue::Table(table))
    }

    #[must_use]
    pub fn output(mut self) -> Self {
        self.direction = ParameterDirection::Output;
        self
    }

    #[must_use]
    pub fn input_output(mut self) -> Self {
        self.direction = ParameterDirection::InputOutput;
        self
    }

    #[must_use]
    pub fn return_value(mut self) -> Self {
        self.direction = ParameterDirection::ReturnValue;
        self
    }

    /// The size of the data type, for output parameters of variable width.
    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// The vendor sql type tag, forwarded to the driver at bind time.
    #[must_use]
    pub fn sql_type(mut self, sql_type: i32) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// The scalar value, if this parameter is not table-valued.
    #[must_use]
    pub fn scalar(&self) -> Option<&RowValue> {
        self.value.scalar()
    }

    #[must_use]
    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Name: '{}', Value: '{:?}', Direction: '{:?}'",
            self.name, self.value, self.direction
        )
    }
}

/// The driver-facing form of a parameter: placeholder-prefixed name plus the
/// vendor type assigned by the [`crate::driver::DatabaseDriver`].
#[derive(Debug, Clone)]
pub struct BoundParameter {
    pub name: String,
    pub value: ParameterValue,
    pub direction: ParameterDirection,
    pub size: Option<usize>,
    pub native_type: Option<i32>,
}

/// A tabular payload for bulk "pass a collection as one parameter" calls.
#[derive(Debug, Clone, PartialEq)]
pub struct TableValue {
    pub type_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValue>>,
}

impl TableValue {
    /// Build a single-column table from primitive items. The column name is
    /// required because primitives carry no field names of their own.
    pub fn of_values<I, V>(
        type_name: impl Into<String>,
        column_name: &str,
        items: I,
    ) -> Result<Self, DataAccessError>
    where
        I: IntoIterator<Item = V>,
        V: Into<RowValue>,
    {
        if column_name.trim().is_empty() {
            return Err(DataAccessError::ConfigError(
                "a column name is required for a table parameter of primitive items".to_string(),
            ));
        }
        Ok(Self {
            type_name: type_name.into(),
            columns: vec![column_name.to_string()],
            rows: items.into_iter().map(|item| vec![item.into()]).collect(),
        })
    }

    /// Build a table with one column per top-level primitive field of the
    /// record type and one row per record.
    pub fn of_records<R: Record>(
        type_name: impl Into<String>,
        records: &[R],
    ) -> Result<Self, DataAccessError> {
        let columns: Vec<String> = R::static_paths()
            .iter()
            .filter(|path| !path.contains('.'))
            .cloned()
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let row = columns
                .iter()
                .map(|column| record.field(column).unwrap_or(RowValue::Null))
                .collect();
            rows.push(row);
        }

        Ok(Self {
            type_name: type_name.into(),
            columns,
            rows,
        })
    }
}
