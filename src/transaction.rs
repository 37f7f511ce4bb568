use std::collections::VecDeque;
use std::sync::Arc;

use crate::command::Executable;
use crate::connection::{ConnectionRef, IsolationLevel, Scope};
use crate::driver::ExecutionContext;
use crate::error::DataAccessError;
use crate::registry::Registry;

enum Mode {
    Local,
    Distributed,
}

/// Runs a queue of commands as a unit of work, strictly in queue order.
///
/// A local transaction opens one connection, begins a database transaction on
/// it, and runs every command on that session; any failure rolls the whole
/// unit back. A distributed transaction instead asks the registry's ambient
/// coordinator for a scope and lets each command manage its own connection
/// under it.
pub struct Transaction {
    mode: Mode,
    isolation: IsolationLevel,
    scope: Scope,
    connection: Option<ConnectionRef>,
    commands: VecDeque<Box<dyn Executable>>,
}

impl Transaction {
    pub fn local() -> Self {
        Self {
            mode: Mode::Local,
            isolation: IsolationLevel::default(),
            scope: Scope::default(),
            connection: None,
            commands: VecDeque::new(),
        }
    }

    pub fn distributed(scope: Scope) -> Self {
        Self {
            mode: Mode::Distributed,
            scope,
            isolation: IsolationLevel::default(),
            connection: None,
            commands: VecDeque::new(),
        }
    }

    pub fn isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    /// Connection the transaction runs on; commands without a connection of
    /// their own inherit it.
    pub fn connection(mut self, name: impl Into<String>) -> Self {
        self.connection = Some(ConnectionRef::Named(name.into()));
        self
    }

    pub fn command(mut self, command: impl Executable + 'static) -> Self {
        self.commands.push_back(Box::new(command));
        self
    }

    pub async fn execute(self, registry: &Registry) -> Result<(), DataAccessError> {
        match self.mode {
            Mode::Local => self.execute_local(registry).await,
            Mode::Distributed => self.execute_distributed(registry).await,
        }
    }

    async fn execute_local(mut self, registry: &Registry) -> Result<(), DataAccessError> {
        let connection = self.connection.clone().ok_or_else(|| {
            DataAccessError::ConfigError("a local transaction requires a connection".into())
        })?;
        let descriptor = connection.resolve(registry)?;

        // Every command must target the transaction's connection.
        for command in &mut self.commands {
            match command.connection_ref() {
                None => command.set_connection(connection.clone()),
                Some(existing) => {
                    if existing.resolve(registry)? != descriptor {
                        return Err(DataAccessError::ConfigError(
                            "command targets a different connection than its transaction".into(),
                        ));
                    }
                }
            }
        }

        let driver = registry.driver(&descriptor.provider_name)?;
        let provider = registry.provider(&descriptor.provider_name)?;
        let mut session = provider.open(&descriptor).await?;
        session.begin(self.isolation).await?;

        let mut failure = None;
        while let Some(mut command) = self.commands.pop_front() {
            if !command.has_driver() {
                command.set_driver(Arc::clone(&driver));
            }
            let context = ExecutionContext {
                session: session.as_mut(),
                driver: &driver,
            };
            if let Err(error) = command.run(registry, Some(context)).await {
                failure = Some(error);
                break;
            }
        }

        match failure {
            Some(error) => {
                tracing::warn!(error = %error, "rolling back transaction");
                if let Err(rollback_error) = session.rollback().await {
                    tracing::warn!(error = %rollback_error, "rollback failed");
                }
                Err(error)
            }
            None => session.commit().await,
        }
    }

    async fn execute_distributed(mut self, registry: &Registry) -> Result<(), DataAccessError> {
        let coordinator = registry.coordinator().ok_or_else(|| {
            DataAccessError::ConfigError(
                "a distributed transaction requires an ambient coordinator".into(),
            )
        })?;
        let scope = coordinator.begin(self.scope, self.isolation).await?;

        let mut failure = None;
        while let Some(mut command) = self.commands.pop_front() {
            if command.connection_ref().is_none()
                && let Some(connection) = &self.connection
            {
                command.set_connection(connection.clone());
            }
            if let Err(error) = command.run(registry, None).await {
                failure = Some(error);
                break;
            }
        }

        match failure {
            Some(error) => {
                tracing::warn!(error = %error, "abandoning transaction scope");
                if let Err(abandon_error) = scope.abandon().await {
                    tracing::warn!(error = %abandon_error, "scope abandon failed");
                }
                Err(error)
            }
            None => scope.complete().await,
        }
    }
}
