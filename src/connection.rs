use serde::{Deserialize, Serialize};

use crate::error::DataAccessError;
use crate::registry::Registry;

/// Describes a database connection without opening it.
///
/// The descriptor is all the engine knows about the physical database; the
/// registered [`crate::driver::ConnectionProvider`] for `provider_name` turns
/// it into an open session at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// The name of the connection
    pub name: String,
    /// The name of the provider that opens it
    pub provider_name: String,
    /// The connection string
    pub connection_string: String,
}

impl ConnectionDescriptor {
    pub fn new(
        name: impl Into<String>,
        provider_name: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_name: provider_name.into(),
            connection_string: connection_string.into(),
        }
    }
}

/// How a command refers to its connection: by registered name, or with an
/// inline descriptor.
#[derive(Debug, Clone)]
pub enum ConnectionRef {
    Named(String),
    Inline(ConnectionDescriptor),
}

impl ConnectionRef {
    pub(crate) fn resolve(&self, registry: &Registry) -> Result<ConnectionDescriptor, DataAccessError> {
        match self {
            ConnectionRef::Named(name) => registry.connection(name).cloned(),
            ConnectionRef::Inline(descriptor) => Ok(descriptor.clone()),
        }
    }
}

/// The isolation level requested for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    #[default]
    Unspecified,
    Chaos,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

/// The ambient scope of a distributed transaction. Ignored by local ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Required,
    RequiresNew,
    Suppress,
}
