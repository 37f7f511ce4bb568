pub mod multiple;
pub mod non_query;
pub mod query;
pub mod response;
pub mod scalar;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::connection::{ConnectionDescriptor, ConnectionRef};
use crate::driver::{
    DatabaseDriver, DatabaseSession, Execution, ExecutionContext, Statement, StatementKind,
};
use crate::error::DataAccessError;
use crate::mapping::{to_camel_case, OutputParameterMap, Record};
use crate::parameter::{BoundParameter, Parameter, ParameterDirection, ParameterValue, TableValue};
use crate::registry::Registry;
use crate::types::{RowValue, Shared};

/// Mutable view of a command handed to the before/after execution hooks.
///
/// Hooks are how values flow between commands at execution time: an earlier
/// command writes a result into a shared record, a later command's before-hook
/// reads it back out and patches its own parameters.
pub struct HookContext<'a> {
    pub parameters: &'a mut Vec<Parameter>,
    pub return_code: i32,
}

impl HookContext<'_> {
    /// Looks up a parameter by its unprefixed name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Replaces the value of an existing parameter, or appends a new input
    /// parameter when no parameter of that name exists yet.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<RowValue>) {
        let value = value.into();
        match self.parameters.iter_mut().find(|p| p.name() == name) {
            Some(parameter) => parameter.value = ParameterValue::Scalar(value),
            None => self.parameters.push(Parameter::new(name, value)),
        }
    }
}

pub type Hook = Box<dyn FnMut(&mut HookContext<'_>) + Send>;

/// Shared state and execution plumbing behind every command variant.
///
/// Variants own a `CommandCore` plus their own result handling; the core
/// handles connection resolution, parameter generation and binding, hook
/// dispatch, timeouts, and post-execution copy-back of output values.
pub struct CommandCore {
    pub(crate) connection: Option<ConnectionRef>,
    pub(crate) driver: Option<Arc<dyn DatabaseDriver>>,
    pub(crate) kind: StatementKind,
    pub(crate) text: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) auto_generate_parameters: bool,
    pub(crate) excluded_properties: Vec<String>,
    pub(crate) record: Option<Shared<dyn Record>>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) output_maps: Vec<OutputParameterMap>,
    pub(crate) before: Option<Hook>,
    pub(crate) after: Option<Hook>,
    pub(crate) return_code: i32,
}

impl Default for CommandCore {
    fn default() -> Self {
        Self {
            connection: None,
            driver: None,
            kind: StatementKind::Text,
            text: String::new(),
            timeout: None,
            auto_generate_parameters: false,
            excluded_properties: Vec::new(),
            record: None,
            parameters: Vec::new(),
            output_maps: Vec::new(),
            before: None,
            after: None,
            return_code: 0,
        }
    }
}

impl CommandCore {
    /// Runs the statement and feeds the raw execution to `read`, which turns
    /// it into the variant's record count. Borrowed `context` means the
    /// command is running inside a transaction on an already-open session;
    /// otherwise the core opens (and drops) its own connection.
    pub(crate) async fn run<F>(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
        read: F,
    ) -> Result<i64, DataAccessError>
    where
        F: FnOnce(&Execution) -> Result<i64, DataAccessError> + Send,
    {
        self.invoke(Self::take_before);
        self.generate_parameters()?;
        self.ensure_unique_parameter_names()?;

        let count = match context {
            Some(context) => {
                self.run_on_session(context.session, context.driver, read)
                    .await?
            }
            None => {
                let descriptor = self.resolve_connection(registry)?;
                let driver = match &self.driver {
                    Some(driver) => Arc::clone(driver),
                    None => registry.driver(&descriptor.provider_name)?,
                };
                let provider = registry.provider(&descriptor.provider_name)?;
                tracing::debug!(
                    connection = %descriptor.name,
                    provider = %descriptor.provider_name,
                    "opening connection"
                );
                let mut session = provider.open(&descriptor).await?;
                self.run_on_session(session.as_mut(), &driver, read).await?
            }
        };

        self.invoke(Self::take_after);
        Ok(count)
    }

    async fn run_on_session<F>(
        &mut self,
        session: &mut dyn DatabaseSession,
        driver: &Arc<dyn DatabaseDriver>,
        read: F,
    ) -> Result<i64, DataAccessError>
    where
        F: FnOnce(&Execution) -> Result<i64, DataAccessError> + Send,
    {
        let statement = self.bind(driver)?;
        tracing::debug!(
            text = %statement.text,
            parameters = statement.parameters.len(),
            "executing statement"
        );

        let execution = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, session.run(&statement))
                .await
                .map_err(|_| DataAccessError::Timeout(limit))??,
            None => session.run(&statement).await?,
        };

        let count = read(&execution)?;
        self.copy_output_values(driver, &execution.parameters)?;
        self.apply_output_maps()?;
        Ok(count)
    }

    /// Appends one input parameter per top-level primitive field of the
    /// configured record, named by camel-casing the column name.
    fn generate_parameters(&mut self) -> Result<(), DataAccessError> {
        if !self.auto_generate_parameters {
            return Ok(());
        }
        let record = self.record.as_ref().ok_or_else(|| {
            DataAccessError::ConfigError(
                "parameter generation requires a record on the command".into(),
            )
        })?;
        let generated: Vec<Parameter> = {
            let guard = record.lock();
            guard
                .paths()
                .iter()
                .filter(|path| {
                    !path.contains('.') && !self.excluded_properties.iter().any(|e| e == *path)
                })
                .map(|path| {
                    Parameter::new(
                        to_camel_case(path),
                        guard.field(path).unwrap_or(RowValue::Null),
                    )
                })
                .collect()
        };
        self.parameters.extend(generated);
        Ok(())
    }

    fn ensure_unique_parameter_names(&self) -> Result<(), DataAccessError> {
        for (position, parameter) in self.parameters.iter().enumerate() {
            if self.parameters[..position]
                .iter()
                .any(|earlier| earlier.name() == parameter.name())
            {
                return Err(DataAccessError::ConfigError(format!(
                    "duplicate parameter name: {}",
                    parameter.name()
                )));
            }
        }
        Ok(())
    }

    fn resolve_connection(
        &self,
        registry: &Registry,
    ) -> Result<ConnectionDescriptor, DataAccessError> {
        let connection = self.connection.as_ref().ok_or_else(|| {
            DataAccessError::ConfigError("command has no connection configured".into())
        })?;
        connection.resolve(registry)
    }

    /// Translates the configured parameters into driver-prefixed bound
    /// parameters; stored procedures get an implicit return-value parameter.
    fn bind(&self, driver: &Arc<dyn DatabaseDriver>) -> Result<Statement, DataAccessError> {
        let placeholder = driver.placeholder();
        let mut bound = Vec::with_capacity(self.parameters.len() + 1);
        for parameter in &self.parameters {
            let mut b = BoundParameter {
                name: format!("{placeholder}{}", parameter.name()),
                value: parameter.value().clone(),
                direction: parameter.direction(),
                size: parameter.size,
                native_type: None,
            };
            if let Some(sql_type) = parameter.sql_type {
                driver.assign_native_type(&mut b, sql_type);
            }
            bound.push(b);
        }
        if self.kind == StatementKind::StoredProcedure {
            bound.push(BoundParameter {
                name: format!("{placeholder}returnValue"),
                value: ParameterValue::Scalar(RowValue::Null),
                direction: ParameterDirection::ReturnValue,
                size: None,
                native_type: None,
            });
        }
        Ok(Statement {
            text: self.text.clone(),
            kind: self.kind,
            timeout: self.timeout,
            parameters: bound,
        })
    }

    /// Copies return-value and output parameter values reported by the driver
    /// back onto the command's parameters.
    fn copy_output_values(
        &mut self,
        driver: &Arc<dyn DatabaseDriver>,
        reported: &[BoundParameter],
    ) -> Result<(), DataAccessError> {
        let placeholder = driver.placeholder();
        for bound in reported {
            match bound.direction {
                ParameterDirection::ReturnValue => {
                    self.return_code = bound
                        .value
                        .scalar()
                        .and_then(RowValue::as_int)
                        .unwrap_or(0) as i32;
                }
                ParameterDirection::Output | ParameterDirection::InputOutput => {
                    let name = bound.name.strip_prefix(placeholder).unwrap_or(&bound.name);
                    let parameter = self
                        .parameters
                        .iter_mut()
                        .find(|p| p.name() == name)
                        .ok_or_else(|| {
                            DataAccessError::ParameterError(format!(
                                "driver reported an unknown output parameter: {name}"
                            ))
                        })?;
                    parameter.value = bound.value.clone();
                }
                ParameterDirection::Input => {}
            }
        }
        Ok(())
    }

    /// Writes mapped output parameter values onto the configured record.
    fn apply_output_maps(&mut self) -> Result<(), DataAccessError> {
        if self.output_maps.is_empty() {
            return Ok(());
        }
        let record = self.record.as_ref().ok_or_else(|| {
            DataAccessError::ConfigError(
                "output parameter mapping requires a record on the command".into(),
            )
        })?;
        let mut guard = record.lock();
        for map in &self.output_maps {
            let parameter = self
                .parameters
                .iter()
                .find(|p| p.name() == map.parameter)
                .ok_or_else(|| {
                    DataAccessError::ConfigError(format!(
                        "output parameter map names an unknown parameter: {}",
                        map.parameter
                    ))
                })?;
            if !matches!(
                parameter.direction(),
                ParameterDirection::Output | ParameterDirection::InputOutput
            ) {
                return Err(DataAccessError::ConfigError(format!(
                    "parameter {} is not an output parameter",
                    map.parameter
                )));
            }
            let ParameterValue::Scalar(value) = parameter.value() else {
                return Err(DataAccessError::ConfigError(format!(
                    "table-valued parameter {} cannot be mapped to a property",
                    map.parameter
                )));
            };
            guard.assign(&map.property, value.clone())?;
        }
        Ok(())
    }

    fn take_before(&mut self) -> &mut Option<Hook> {
        &mut self.before
    }

    fn take_after(&mut self) -> &mut Option<Hook> {
        &mut self.after
    }

    fn invoke(&mut self, slot: fn(&mut Self) -> &mut Option<Hook>) {
        let Some(mut hook) = slot(self).take() else {
            return;
        };
        let mut context = HookContext {
            parameters: &mut self.parameters,
            return_code: self.return_code,
        };
        hook(&mut context);
        *slot(self) = Some(hook);
    }
}

/// Fluent configuration shared by every command variant.
pub trait ConfigureCommand: Sized {
    #[doc(hidden)]
    fn core_mut(&mut self) -> &mut CommandCore;

    /// Targets a connection registered by name.
    fn connection(mut self, name: impl Into<String>) -> Self {
        self.core_mut().connection = Some(ConnectionRef::Named(name.into()));
        self
    }

    /// Targets an ad-hoc connection described inline.
    fn connection_string(
        mut self,
        provider_name: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        self.core_mut().connection = Some(ConnectionRef::Inline(ConnectionDescriptor::new(
            "",
            provider_name,
            connection_string,
        )));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        let core = self.core_mut();
        core.text = text.into();
        core.kind = StatementKind::Text;
        self
    }

    fn stored_procedure(mut self, name: impl Into<String>) -> Self {
        let core = self.core_mut();
        core.text = name.into();
        core.kind = StatementKind::StoredProcedure;
        self
    }

    fn timeout(mut self, timeout: Duration) -> Self {
        self.core_mut().timeout = Some(timeout);
        self
    }

    /// Overrides the driver normally looked up from the connection's provider.
    fn driver(mut self, driver: Arc<dyn DatabaseDriver>) -> Self {
        self.core_mut().driver = Some(driver);
        self
    }

    fn parameter(mut self, name: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.core_mut().parameters.push(Parameter::new(name, value));
        self
    }

    fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.core_mut().parameters.extend(parameters);
        self
    }

    fn table_parameter(mut self, name: impl Into<String>, value: TableValue) -> Self {
        self.core_mut().parameters.push(Parameter::table(name, value));
        self
    }

    /// Attaches the record that parameter generation and output parameter
    /// maps operate on.
    fn record<R: Record + 'static>(mut self, record: &Shared<R>) -> Self {
        self.core_mut().record = Some(record.to_record());
        self
    }

    /// Generates one input parameter per top-level field of the attached
    /// record, skipping the named columns.
    fn auto_generate_parameters(mut self, excluded: &[&str]) -> Self {
        let core = self.core_mut();
        core.auto_generate_parameters = true;
        core.excluded_properties = excluded.iter().map(|e| e.to_string()).collect();
        self
    }

    fn map_output_parameters(
        mut self,
        maps: impl IntoIterator<Item = OutputParameterMap>,
    ) -> Self {
        self.core_mut().output_maps.extend(maps);
        self
    }

    fn on_before_executed(
        mut self,
        hook: impl FnMut(&mut HookContext<'_>) + Send + 'static,
    ) -> Self {
        self.core_mut().before = Some(Box::new(hook));
        self
    }

    fn on_after_executed(
        mut self,
        hook: impl FnMut(&mut HookContext<'_>) + Send + 'static,
    ) -> Self {
        self.core_mut().after = Some(Box::new(hook));
        self
    }
}

/// Type-erased command interface used by [`crate::transaction::Transaction`]
/// to queue heterogeneous commands.
#[async_trait]
pub trait Executable: Send {
    async fn run(
        &mut self,
        registry: &Registry,
        context: Option<ExecutionContext<'_>>,
    ) -> Result<i64, DataAccessError>;

    fn connection_ref(&self) -> Option<&ConnectionRef>;
    fn set_connection(&mut self, connection: ConnectionRef);
    fn has_driver(&self) -> bool;
    fn set_driver(&mut self, driver: Arc<dyn DatabaseDriver>);
}

macro_rules! impl_executable_accessors {
    () => {
        fn connection_ref(&self) -> Option<&crate::connection::ConnectionRef> {
            self.core.connection.as_ref()
        }

        fn set_connection(&mut self, connection: crate::connection::ConnectionRef) {
            self.core.connection = Some(connection);
        }

        fn has_driver(&self) -> bool {
            self.core.driver.is_some()
        }

        fn set_driver(&mut self, driver: std::sync::Arc<dyn crate::driver::DatabaseDriver>) {
            self.core.driver = Some(driver);
        }
    };
}
pub(crate) use impl_executable_accessors;
