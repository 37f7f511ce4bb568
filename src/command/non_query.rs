use async_trait::async_trait;

use crate::command::response::{NonQueryResponse, Response};
use crate::command::{impl_executable_accessors, CommandCore, ConfigureCommand, Executable};
use crate::driver::ExecutionContext;
use crate::error::DataAccessError;
use crate::parameter::ParameterValue;
use crate::registry::Registry;
use crate::types::RowValue;

/// Executes a statement for its side effects and reports the affected row
/// count.
///
/// By default, zero affected rows is treated as a failed update: the command
/// fails with [`DataAccessError::NoRecordUpdated`], or with
/// [`DataAccessError::ConcurrencyViolation`] when a null `rowVersion`
/// parameter suggests the row was changed underneath the caller. Use
/// [`NonQueryCommand::throw_when_no_record_updated`] to opt out for
/// statements where zero rows is a legitimate outcome.
#[derive(Default)]
pub struct NonQueryCommand {
    core: CommandCore,
    throw_when_no_record_updated: Option<bool>,
    affected_rows: u64,
}

impl NonQueryCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn throw_when_no_record_updated(mut self, throw: bool) -> Self {
        self.throw_when_no_record_updated = Some(throw);
        self
    }

    async fn run_inner(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        let affected = &mut self.affected_rows;
        let count = self
            .core
            .run(registry, context, |execution| {
                *affected = execution.affected_rows;
                Ok(execution.affected_rows as i64)
            })
            .await?;
        if self.affected_rows == 0 && self.throw_when_no_record_updated.unwrap_or(true) {
            return Err(self.no_record_error());
        }
        Ok(count)
    }

    /// A null `rowVersion` parameter after execution means optimistic
    /// concurrency kicked in rather than the row simply being missing.
    fn no_record_error(&self) -> DataAccessError {
        let has_null_row_version = self.core.parameters.iter().any(|p| {
            p.name() == "rowVersion" && matches!(p.value(), ParameterValue::Scalar(RowValue::Null))
        });
        if has_null_row_version {
            DataAccessError::ConcurrencyViolation
        } else {
            DataAccessError::NoRecordUpdated
        }
    }

    pub async fn execute(
        mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<NonQueryResponse, DataAccessError> {
        self.run_inner(registry, context).await?;
        Ok(NonQueryResponse {
            affected_rows: self.affected_rows,
            response: Response {
                return_code: self.core.return_code,
                parameters: self.core.parameters,
            },
        })
    }
}

impl ConfigureCommand for NonQueryCommand {
    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }
}

#[async_trait]
impl Executable for NonQueryCommand {
    async fn run(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError> {
        self.run_inner(registry, context).await
    }

    impl_executable_accessors!();
}
