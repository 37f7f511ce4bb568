//! The two narrow contracts the engine consumes: per-vendor drivers and
//! connection providers, plus the ambient-transaction capability used by
//! distributed transactions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::connection::{ConnectionDescriptor, IsolationLevel, Scope};
use crate::error::DataAccessError;
use crate::parameter::BoundParameter;
use crate::results::RowSet;

/// The kind of statement a command executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Text,
    StoredProcedure,
}

/// A fully bound statement, ready for a session to run.
#[derive(Debug, Clone)]
pub struct Statement {
    pub text: String,
    pub kind: StatementKind,
    pub timeout: Option<Duration>,
    pub parameters: Vec<BoundParameter>,
}

/// Everything a session reports back from running one statement: the
/// affected-row count, the result sets in cursor order, and the bound
/// parameters carrying their post-execution values.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    pub affected_rows: u64,
    pub result_sets: Vec<RowSet>,
    pub parameters: Vec<BoundParameter>,
}

/// Deals with the database vendor differences.
pub trait DatabaseDriver: Send + Sync {
    /// The parameter placeholder prefix of the database (e.g. `"@"`).
    fn placeholder(&self) -> &str;

    /// Assign a vendor parameter type not covered by the generic ones.
    fn assign_native_type(&self, parameter: &mut BoundParameter, sql_type: i32) {
        parameter.native_type = Some(sql_type);
    }
}

/// An open physical connection, possibly carrying a native transaction.
///
/// Ownership of a session belongs to whichever scope opened it (the command
/// itself, or the transaction sharing it across commands) and it is released
/// exactly once, by drop, on every exit path.
#[async_trait]
pub trait DatabaseSession: Send {
    /// Run one bound statement and materialize its results.
    async fn run(&mut self, statement: &Statement) -> Result<Execution, DataAccessError>;

    /// Begin a native transaction at the requested isolation level.
    async fn begin(&mut self, isolation: IsolationLevel) -> Result<(), DataAccessError>;

    async fn commit(&mut self) -> Result<(), DataAccessError>;

    async fn rollback(&mut self) -> Result<(), DataAccessError>;
}

/// Opens physical connections for a provider.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn open(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Box<dyn DatabaseSession>, DataAccessError>;
}

/// An ambient transaction boundary spanning multiple connections.
#[async_trait]
pub trait AmbientScope: Send {
    /// Mark the boundary successful.
    async fn complete(self: Box<Self>) -> Result<(), DataAccessError>;

    /// Abort the boundary, rolling back every enlisted connection.
    async fn abandon(self: Box<Self>) -> Result<(), DataAccessError>;
}

/// Starts ambient transaction boundaries for distributed transactions.
#[async_trait]
pub trait AmbientCoordinator: Send + Sync {
    async fn begin(
        &self,
        scope: Scope,
        isolation: IsolationLevel,
    ) -> Result<Box<dyn AmbientScope>, DataAccessError>;
}

/// The ambient context a transaction threads through its queued commands: a
/// shared session plus the driver resolved for the transaction's connection.
///
/// Command execution favors this over the command's own connection when
/// present.
pub struct ExecutionContext<'a> {
    pub session: &'a mut dyn DatabaseSession,
    pub driver: &'a Arc<dyn DatabaseDriver>,
}
