//! Convenience re-exports for the common surface of the crate.

pub use crate::command::multiple::{
    CollectionResultSet, MultipleResultsCommand, ObjectResultSet, ResultSetReader,
};
pub use crate::command::non_query::NonQueryCommand;
pub use crate::command::query::{CollectionQuery, SingleQuery};
pub use crate::command::response::{
    CollectionQueryResponse, MultipleResultsResponse, NonQueryResponse, Response, ScalarResponse,
    SingleQueryResponse,
};
pub use crate::command::scalar::ScalarCommand;
pub use crate::command::{ConfigureCommand, Executable, Hook, HookContext};
pub use crate::connection::{ConnectionDescriptor, ConnectionRef, IsolationLevel, Scope};
pub use crate::driver::{
    AmbientCoordinator, AmbientScope, ConnectionProvider, DatabaseDriver, DatabaseSession,
    Execution, ExecutionContext, Statement, StatementKind,
};
pub use crate::error::DataAccessError;
pub use crate::impl_record;
pub use crate::mapping::{
    FromRowValue, IntoRowValue, MappedProperty, OutputParameterMap, PropertyMap, Record, TypeMap,
};
pub use crate::parameter::{
    BoundParameter, Parameter, ParameterDirection, ParameterValue, TableValue,
};
pub use crate::registry::Registry;
pub use crate::results::{Row, RowSet};
pub use crate::script::{execute_script, GO_DELIMITER};
pub use crate::transaction::Transaction;
pub use crate::types::{RowValue, Shared};
