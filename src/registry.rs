use std::collections::HashMap;
use std::sync::Arc;

use crate::connection::ConnectionDescriptor;
use crate::driver::{AmbientCoordinator, ConnectionProvider, DatabaseDriver};
use crate::error::DataAccessError;

/// Explicit registration of drivers, connection providers, and named
/// connections.
///
/// The registry is passed to every execution instead of living in a global,
/// so two registries with different backends can coexist in one process:
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use sql_access::prelude::*;
/// # fn demo(driver: Arc<dyn DatabaseDriver>, provider: Arc<dyn ConnectionProvider>) {
/// let registry = Registry::new()
///     .with_provider("sqlserver", driver, provider)
///     .with_connection(ConnectionDescriptor::new(
///         "main",
///         "sqlserver",
///         "Server=db;Database=app",
///     ));
/// # let _ = registry;
/// # }
/// ```
#[derive(Default)]
pub struct Registry {
    drivers: HashMap<String, Arc<dyn DatabaseDriver>>,
    providers: HashMap<String, Arc<dyn ConnectionProvider>>,
    connections: HashMap<String, ConnectionDescriptor>,
    coordinator: Option<Arc<dyn AmbientCoordinator>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the driver and connection provider for a provider name.
    #[must_use]
    pub fn with_provider(
        mut self,
        provider_name: impl Into<String>,
        driver: Arc<dyn DatabaseDriver>,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Self {
        let provider_name = provider_name.into();
        self.drivers.insert(provider_name.clone(), driver);
        self.providers.insert(provider_name, provider);
        self
    }

    /// Register a named connection descriptor.
    #[must_use]
    pub fn with_connection(mut self, descriptor: ConnectionDescriptor) -> Self {
        self.connections.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Register every descriptor in a JSON array, as read from a config file:
    /// `[{"name": "main", "provider_name": "sqlserver", "connection_string": "..."}]`.
    pub fn with_connections_json(mut self, json: &str) -> Result<Self, DataAccessError> {
        let descriptors: Vec<ConnectionDescriptor> = serde_json::from_str(json)
            .map_err(|e| DataAccessError::ConfigError(format!("invalid connection config: {e}")))?;
        for descriptor in descriptors {
            self = self.with_connection(descriptor);
        }
        Ok(self)
    }

    /// Register the coordinator used by distributed transactions.
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: Arc<dyn AmbientCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn driver(&self, provider_name: &str) -> Result<Arc<dyn DatabaseDriver>, DataAccessError> {
        self.drivers.get(provider_name).cloned().ok_or_else(|| {
            DataAccessError::ConfigError(format!(
                "no driver registered for provider '{provider_name}'"
            ))
        })
    }

    pub fn provider(
        &self,
        provider_name: &str,
    ) -> Result<Arc<dyn ConnectionProvider>, DataAccessError> {
        self.providers.get(provider_name).cloned().ok_or_else(|| {
            DataAccessError::ConfigError(format!(
                "no connection provider registered for provider '{provider_name}'"
            ))
        })
    }

    pub fn connection(&self, name: &str) -> Result<&ConnectionDescriptor, DataAccessError> {
        self.connections
            .get(name)
            .ok_or_else(|| DataAccessError::ConfigError(format!("unknown connection: '{name}'")))
    }

    #[must_use]
    pub fn coordinator(&self) -> Option<Arc<dyn AmbientCoordinator>> {
        self.coordinator.clone()
    }
}
