use async_trait::async_trait;

use crate::command::response::{Response, ScalarResponse};
use crate::command::{impl_executable_accessors, CommandCore, ConfigureCommand, Executable};
use crate::driver::ExecutionContext;
use crate::error::DataAccessError;
use crate::mapping::FromRowValue;
use crate::registry::Registry;
use crate::types::RowValue;

/// Executes a statement and converts the first cell of the first row into a
/// single value. A missing or null cell yields the type's default.
pub struct ScalarCommand<T> {
    core: CommandCore,
    value: Option<T>,
}

impl<T> Default for ScalarCommand<T> {
    fn default() -> Self {
        Self {
            core: CommandCore::default(),
            value: None,
        }
    }
}

impl<T> ScalarCommand<T>
where
    T: FromRowValue + Default + Send,
{
    pub fn new() -> Self {
        Self::default()
    }

    async fn run_inner(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        let slot = &mut self.value;
        self.core
            .run(registry, context, |execution| {
                let cell = execution
                    .result_sets
                    .first()
                    .and_then(|rows| rows.get(0))
                    .and_then(|row| row.get_by_index(0));
                let value = match cell {
                    None | Some(RowValue::Null) => T::default(),
                    Some(value) => T::from_row_value(value.clone())?,
                };
                *slot = Some(value);
                Ok(i64::from(cell.is_some()))
            })
            .await
    }

    pub async fn execute(
        mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<ScalarResponse<T>, DataAccessError> {
        self.run_inner(registry, context).await?;
        Ok(ScalarResponse {
            value: self.value.take().unwrap_or_default(),
            response: Response {
                return_code: self.core.return_code,
                parameters: self.core.parameters,
            },
        })
    }
}

impl<T> ConfigureCommand for ScalarCommand<T> {
    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }
}

#[async_trait]
impl<T> Executable for ScalarCommand<T>
where
    T: FromRowValue + Default + Send,
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
