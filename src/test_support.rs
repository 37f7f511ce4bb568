//! In-memory scripted backend for exercising commands and transactions
//! without a real database. Only compiled with the `test-utils` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::connection::{ConnectionDescriptor, IsolationLevel, Scope};
use crate::driver::{
    AmbientCoordinator, AmbientScope, ConnectionProvider, DatabaseDriver, DatabaseSession,
    Execution, Statement,
};
use crate::error::DataAccessError;
use crate::parameter::{ParameterDirection, ParameterValue};
use crate::results::RowSet;
use crate::types::RowValue;

/// Driver stub with a configurable placeholder prefix.
pub struct StubDriver {
    placeholder: &'static str,
}

impl StubDriver {
    pub fn new(placeholder: &'static str) -> Self {
        Self { placeholder }
    }
}

impl DatabaseDriver for StubDriver {
    fn placeholder(&self) -> &str {
        self.placeholder
    }
}

/// Everything the backend observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Opened,
    Ran(String),
    Began(IsolationLevel),
    Committed,
    RolledBack,
    ScopeBegan(Scope),
    ScopeCompleted,
    ScopeAbandoned,
}

/// Canned result for one statement.
#[derive(Clone, Default)]
pub struct StatementOutcome {
    affected_rows: u64,
    result_sets: Vec<RowSet>,
    out_values: Vec<(String, RowValue)>,
    return_code: Option<i32>,
    delay: Option<Duration>,
}

impl StatementOutcome {
    pub fn affected(rows: u64) -> Self {
        Self {
            affected_rows: rows,
            ..Self::default()
        }
    }

    pub fn rows(mut self, rows: RowSet) -> Self {
        self.result_sets.push(rows);
        self
    }

    /// Reports an output value for a bound parameter, named with its
    /// placeholder prefix (e.g. `"@total"`).
    pub fn out_value(mut self, bound_name: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.out_values.push((bound_name.into(), value.into()));
        self
    }

    pub fn returning(mut self, code: i32) -> Self {
        self.return_code = Some(code);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = Box<dyn Fn(&Statement) -> Result<StatementOutcome, DataAccessError> + Send + Sync>;

#[derive(Default)]
struct BackendState {
    handlers: HashMap<String, Handler>,
    events: Vec<BackendEvent>,
    executed: Vec<Statement>,
}

/// Scripted provider and ambient coordinator: statements are answered by
/// handlers keyed on their exact text, and every session and scope action is
/// recorded for assertions.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, text: impl Into<String>, outcome: StatementOutcome) {
        self.respond_with(text, move |_| Ok(outcome.clone()));
    }

    pub fn respond_with(
        &self,
        text: impl Into<String>,
        handler: impl Fn(&Statement) -> Result<StatementOutcome, DataAccessError>
            + Send
            + Sync
            + 'static,
    ) {
        self.lock()
            .handlers
            .insert(text.into(), Box::new(handler));
    }

    pub fn events(&self) -> Vec<BackendEvent> {
        self.lock().events.clone()
    }

    /// Statements in execution order, with their bound parameters.
    pub fn executed(&self) -> Vec<Statement> {
        self.lock().executed.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ConnectionProvider for ScriptedBackend {
    async fn open(
        &self,
        _descriptor: &ConnectionDescriptor,
    ) -> Result<Box<dyn DatabaseSession>, DataAccessError> {
        self.lock().events.push(BackendEvent::Opened);
        Ok(Box::new(ScriptedSession {
            state: Arc::clone(&self.state),
        }))
    }
}

#[async_trait]
impl AmbientCoordinator for ScriptedBackend {
    async fn begin(
        &self,
        scope: Scope,
        _isolation: IsolationLevel,
    ) -> Result<Box<dyn AmbientScope>, DataAccessError> {
        self.lock().events.push(BackendEvent::ScopeBegan(scope));
        Ok(Box::new(ScriptedScope {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedSession {
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedSession {
    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DatabaseSession for ScriptedSession {
    async fn run(&mut self, statement: &Statement) -> Result<Execution, DataAccessError> {
        let outcome = {
            let mut state = self.lock();
            state.events.push(BackendEvent::Ran(statement.text.clone()));
            state.executed.push(statement.clone());
            let handler = state.handlers.get(&statement.text).ok_or_else(|| {
                DataAccessError::ExecutionError(format!(
                    "no scripted response for statement: {}",
                    statement.text
                ))
            })?;
            handler(statement)?
        };

        if let Some(delay) = outcome.delay {
            tokio::time::sleep(delay).await;
        }

        let mut parameters = statement.parameters.clone();
        for (name, value) in &outcome.out_values {
            let parameter = parameters
                .iter_mut()
                .find(|p| p.name == *name)
                .ok_or_else(|| {
                    DataAccessError::ExecutionError(format!(
                        "scripted outcome names an unknown parameter: {name}"
                    ))
                })?;
            parameter.value = ParameterValue::Scalar(value.clone());
        }
        if let Some(code) = outcome.return_code
            && let Some(parameter) = parameters
                .iter_mut()
                .find(|p| p.direction == ParameterDirection::ReturnValue)
        {
            parameter.value = ParameterValue::Scalar(RowValue::Int(i64::from(code)));
        }

        Ok(Execution {
            affected_rows: outcome.affected_rows,
            result_sets: outcome.result_sets,
            parameters,
        })
    }

    async fn begin(&mut self, isolation: IsolationLevel) -> Result<(), DataAccessError> {
        self.lock().events.push(BackendEvent::Began(isolation));
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DataAccessError> {
        self.lock().events.push(BackendEvent::Committed);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DataAccessError> {
        self.lock().events.push(BackendEvent::RolledBack);
        Ok(())
    }
}

struct ScriptedScope {
    state: Arc<Mutex<BackendState>>,
}

#[async_trait]
impl AmbientScope for ScriptedScope {
    async fn complete(self: Box<Self>) -> Result<(), DataAccessError> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .events
            .push(BackendEvent::ScopeCompleted);
        Ok(())
    }

    async fn abandon(self: Box<Self>) -> Result<(), DataAccessError> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .events
            .push(BackendEvent::ScopeAbandoned);
        Ok(())
    }
}
