use crate::parameter::Parameter;
use crate::types::Shared;

/// Post-execution state common to every command variant: the stored procedure
/// return code and the final parameter list, with output values copied back.
#[derive(Default)]
pub struct Response {
    pub return_code: i32,
    pub parameters: Vec<Parameter>,
}

impl Response {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }
}

pub struct NonQueryResponse {
    pub response: Response,
    pub affected_rows: u64,
}

pub struct ScalarResponse<T> {
    pub response: Response,
    pub value: T,
}

pub struct SingleQueryResponse<T> {
    pub response: Response,
    /// `None` when the query returned no rows and no instance was supplied.
    pub record: Option<Shared<T>>,
}

pub struct CollectionQueryResponse<T> {
    pub response: Response,
    pub records: Shared<Vec<T>>,
    /// Total record count: the value of a `count` output parameter when the
    /// statement reports one, otherwise the collection length.
    pub count: i64,
}

pub struct MultipleResultsResponse {
    pub response: Response,
    pub rows_read: i64,
}
