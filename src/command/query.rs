use async_trait::async_trait;

use crate::command::response::{CollectionQueryResponse, Response, SingleQueryResponse};
use crate::command::{impl_executable_accessors, CommandCore, ConfigureCommand, Executable};
use crate::driver::ExecutionContext;
use crate::error::DataAccessError;
use crate::mapping::{MappedProperty, PropertyMap, Record, TypeMap};
use crate::reader::TypeReader;
use crate::registry::Registry;
use crate::results::{Row, RowSet};
use crate::types::{RowValue, Shared};

/// Queries for at most one record.
///
/// With no supplied instance, the record is created on read (through the
/// type map when one is configured). Zero rows is not an error: the response
/// simply carries no record. Two or more rows fail with
/// [`DataAccessError::MoreThanOneRecord`].
pub struct SingleQuery<T> {
    core: CommandCore,
    reader: TypeReader<T>,
    instance: Option<Shared<T>>,
}

impl<T> Default for SingleQuery<T> {
    fn default() -> Self {
        Self {
            core: CommandCore::default(),
            reader: TypeReader::default(),
            instance: None,
        }
    }
}

impl<T> SingleQuery<T>
where
    T: Record + Default + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads into an existing record instead of creating one, and makes it
    /// available to parameter generation and output parameter maps.
    pub fn instance(mut self, record: &Shared<T>) -> Self {
        self.core.record = Some(record.to_record());
        self.instance = Some(record.clone());
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

    pub fn on_record_read(mut self, callback: impl FnMut(&Row, &mut T) + Send + 'static) -> Self {
        self.reader.set_callback(callback);
        self
    }

    async fn run_inner(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        let Self {
            core,
            reader,
            instance,
        } = self;
        core.run(registry, context, |execution| {
            let empty = RowSet::default();
            let rows = execution.result_sets.first().unwrap_or(&empty);
            let (record, count) = reader.read_single(rows, instance.take())?;
            *instance = record;
            Ok(count)
        })
        .await
    }

    pub async fn execute(
        mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<SingleQueryResponse<T>, DataAccessError> {
        self.run_inner(registry, context).await?;
        Ok(SingleQueryResponse {
            record: self.instance,
            response: Response {
                return_code: self.core.return_code,
                parameters: self.core.parameters,
            },
        })
    }
}

impl<T> ConfigureCommand for SingleQuery<T> {
    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }
}

#[async_trait]
impl<T> Executable for SingleQuery<T>
where
    T: Record + Default + Send + 'static,
{
    async fn run(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        self.run_inner(registry, context).await
    }

    impl_executable_accessors!();
}

/// Queries for a collection of records.
///
/// Rows update the supplied collection in place positionally; rows past the
/// end append new records. The reported count prefers a `count` output
/// parameter (set by paging statements) over the collection length.
pub struct CollectionQuery<T> {
    core: CommandCore,
    reader: TypeReader<T>,
    records: Shared<Vec<T>>,
}

impl<T> Default for CollectionQuery<T> {
    fn default() -> Self {
        Self {
            core: CommandCore::default(),
            reader: TypeReader::default(),
            records: Shared::new(Vec::new()),
        }
    }
}

impl<T> CollectionQuery<T>
where
    T: Record + Default + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads into an existing collection instead of starting empty.
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

    pub fn on_record_read(mut self, callback: impl FnMut(&Row, &mut T) + Send + 'static) -> Self {
        self.reader.set_callback(callback);
        self
    }

    async fn run_inner(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        let Self {
            core,
            reader,
            records,
        } = self;
        let rows_read = core
            .run(registry, context, |execution| {
                let empty = RowSet::default();
                let rows = execution.result_sets.first().unwrap_or(&empty);
                let mut guard = records.lock();
                reader.read_collection(rows, &mut guard)
            })
            .await?;
        Ok(self.count(rows_read))
    }

    fn count(&self, rows_read: i64) -> i64 {
        self.core
            .parameters
            .iter()
            .find(|p| p.name() == "count")
            .and_then(|p| p.scalar().and_then(RowValue::as_int))
            .unwrap_or(rows_read)
    }

    pub async fn execute(
        mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<CollectionQueryResponse<T>, DataAccessError> {
        let count = self.run_inner(registry, context).await?;
        Ok(CollectionQueryResponse {
            records: self.records,
            count,
            response: Response {
                return_code: self.core.return_code,
                parameters: self.core.parameters,
            },
        })
    }
}

impl<T> ConfigureCommand for CollectionQuery<T> {
    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }
}

#[async_trait]
impl<T> Executable for CollectionQuery<T>
where
    T: Record + Default + Send + 'static,
{
    async fn run(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        self.run_inner(registry, context).await
    }

    impl_executable_accessors!();
}
