use async_trait::async_trait;

use crate::command::response::{MultipleResultsResponse, Response};
use crate::command::{impl_executable_accessors, CommandCore, ConfigureCommand, Executable};
use crate::driver::ExecutionContext;
use crate::error::DataAccessError;
use crate::mapping::{MappedProperty, PropertyMap, Record, TypeMap};
use crate::reader::TypeReader;
use crate::registry::Registry;
use crate::results::RowSet;
use crate::types::Shared;

/// Consumes one result set of a multi-result statement.
///
/// Readers are queued on a [`MultipleResultsCommand`] in the order the
/// statement produces its result sets.
pub trait ResultSetReader: Send {
    fn read(&mut self, rows: &RowSet) -> Result<i64, DataAccessError>;
}

/// Reads a result set of at most one row into a shared record. The record is
/// created eagerly so callers can hold a handle to it before execution.
pub struct ObjectResultSet<T> {
    reader: TypeReader<T>,
    record: Shared<T>,
}

impl<T> ObjectResultSet<T>
where
    T: Record + Default + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            reader: TypeReader::default(),
            record: Shared::new(T::default()),
        }
    }

    pub fn instance(mut self, record: &Shared<T>) -> Self {
        self.record = record.clone();
        self
    }

    pub fn map_properties(mut self, properties: impl IntoIterator<Item = MappedProperty>) -> Self {
        self.reader.set_property_map(PropertyMap::new(properties));
        self
    }

    /// Handle to the record this reader populates.
    pub fn data(&self) -> Shared<T> {
        self.record.clone()
    }
}

impl<T> Default for ObjectResultSet<T>
where
    T: Record + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultSetReader for ObjectResultSet<T>
where
    T: Record + Default + Send + 'static,
{
    fn read(&mut self, rows: &RowSet) -> Result<i64, DataAccessError> {
        let (_, count) = self.reader.read_single(rows, Some(self.record.clone()))?;
        Ok(count)
    }
}

/// Reads a result set into a shared collection, updating existing elements in
/// place positionally.
pub struct CollectionResultSet<T> {
    reader: TypeReader<T>,
    records: Shared<Vec<T>>,
}

impl<T> CollectionResultSet<T>
where
    T: Record + Default + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            reader: TypeReader::default(),
            records: Shared::new(Vec::new()),
        }
    }

    pub fn instances(mut self, records: &Shared<Vec<T>>) -> Self {
        self.records = records.clone();
        self
    }

    pub fn map_properties(mut self, properties: impl IntoIterator<Item = MappedProperty>) -> Self {
        self.reader.set_property_map(PropertyMap::new(properties));
        self
    }

    pub fn map_types(mut self, map: TypeMap<T>) -> Self {
        self.reader.set_type_map(map);
        self
    }

    pub fn data(&self) -> Shared<Vec<T>> {
        self.records.clone()
    }
}

impl<T> Default for CollectionResultSet<T>
where
    T: Record + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultSetReader for CollectionResultSet<T>
where
    T: Record + Default + Send + 'static,
{
    fn read(&mut self, rows: &RowSet) -> Result<i64, DataAccessError> {
        let mut guard = self.records.lock();
        self.reader.read_collection(rows, &mut guard)
    }
}

/// Executes a statement that produces several result sets and dispatches each
/// one, in order, to its queued reader. Result sets the statement did not
/// produce are read as empty.
#[derive(Default)]
pub struct MultipleResultsCommand {
    core: CommandCore,
    readers: Vec<Box<dyn ResultSetReader>>,
}

impl MultipleResultsCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result_set(mut self, reader: impl ResultSetReader + 'static) -> Self {
        self.readers.push(Box::new(reader));
        self
    }

    async fn run_inner(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        let readers = &mut self.readers;
        self.core
            .run(registry, context, |execution| {
                let empty = RowSet::default();
                let mut total = 0;
                for (position, reader) in readers.iter_mut().enumerate() {
                    let rows = execution.result_sets.get(position).unwrap_or(&empty);
                    total += reader.read(rows)?;
                }
                Ok(total)
            })
            .await
    }

    pub async fn execute(
        mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<MultipleResultsResponse, DataAccessError> {
        let rows_read = self.run_inner(registry, context).await?;
        Ok(MultipleResultsResponse {
            rows_read,
            response: Response {
                return_code: self.core.return_code,
                parameters: self.core.parameters,
            },
        })
    }
}

impl ConfigureCommand for MultipleResultsCommand {
    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }
}

#[async_trait]
impl Executable for MultipleResultsCommand {
    async fn run(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        self.run_inner(registry, context).await
    }

    impl_executable_accessors!();
}
