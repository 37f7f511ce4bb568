/// Maps an output parameter onto a record property.
///
/// Applied after execution: the named parameter must exist with an output
/// direction and a record instance must be attached to the command, both
/// checked at execution time rather than at configuration time.
#[derive(Debug, Clone)]
pub struct OutputParameterMap {
    /// The name of the parameter to take the value from
    pub parameter: String,
    /// The (possibly dotted) record property to populate
    pub property: String,
}

impl OutputParameterMap {
    pub fn new(parameter: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            property: property.into(),
        }
    }
}
