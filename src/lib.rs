//! Database-agnostic command and query execution.
//!
//! Commands are configured fluently, bound through a driver-specific
//! placeholder convention, and executed against any registered connection
//! provider. Result rows map onto plain records through the [`Record`] trait,
//! and a [`transaction::Transaction`] runs a queue of commands as one unit of
//! work, locally on a shared connection or under an ambient coordinator.

pub mod command;
pub mod connection;
pub mod driver;
pub mod error;
pub mod mapping;
pub mod parameter;
pub mod prelude;
mod reader;
pub mod registry;
pub mod results;
pub mod script;
#[cfg(feature = "test-utils")]
pub mod test_support;
pub mod transaction;
pub mod types;

pub use command::multiple::{CollectionResultSet, MultipleResultsCommand, ObjectResultSet};
pub use command::non_query::NonQueryCommand;
pub use command::query::{CollectionQuery, SingleQuery};
pub use command::scalar::ScalarCommand;
pub use command::{ConfigureCommand, Executable, HookContext};
pub use error::DataAccessError;
pub use mapping::Record;
pub use parameter::Parameter;
pub use registry::Registry;
pub use script::execute_script;
pub use transaction::Transaction;
pub use types::{RowValue, Shared};
