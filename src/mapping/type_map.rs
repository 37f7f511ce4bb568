use crate::error::DataAccessError;
use crate::results::Row;

/// Maps the value read from the discriminator column to a concrete record
/// constructor, enabling polymorphic row materialization.
///
/// The element type is typically an enum whose variants wrap the concrete
/// shapes; every constructor is registered up front, so no open-ended
/// dynamic construction happens at read time:
/// ```rust
/// # use sql_access::mapping::TypeMap;
/// #[derive(Default)]
/// enum Person {
///     #[default]
///     Unknown,
///     Employee,
///     Customer,
/// }
///
/// // Discriminator in column 0; values default to the 1-based position.
/// let map = TypeMap::new(0)
///     .entry(|| Person::Employee)
///     .entry(|| Person::Customer);
/// # let _ = map;
/// ```
pub struct TypeMap<T> {
    discriminator_index: usize,
    entries: Vec<(i64, fn() -> T)>,
}

impl<T> TypeMap<T> {
    #[must_use]
    pub fn new(discriminator_index: usize) -> Self {
        Self {
            discriminator_index,
            entries: Vec::new(),
        }
    }

    /// Register a constructor keyed by its 1-based position in the map.
    #[must_use]
    pub fn entry(self, factory: fn() -> T) -> Self {
        let value = self.entries.len() as i64 + 1;
        self.entry_with_value(value, factory)
    }

    /// Register a constructor keyed by an explicit discriminator value.
    #[must_use]
    pub fn entry_with_value(mut self, value: i64, factory: fn() -> T) -> Self {
        self.entries.push((value, factory));
        self
    }

    /// Instantiate the concrete type for the row's discriminator value.
    pub(crate) fn create(&self, row: &Row) -> Result<T, DataAccessError> {
        let cell = row.get_by_index(self.discriminator_index).ok_or_else(|| {
            DataAccessError::MappingError(format!(
                "row has no discriminator column at index {}",
                self.discriminator_index
            ))
        })?;
        let value = cell.as_int().ok_or_else(|| {
            DataAccessError::MappingError(format!(
                "discriminator column {} is not an integer: {cell:?}",
                self.discriminator_index
            ))
        })?;

        let factory = self
            .entries
            .iter()
            .find(|(entry, _)| *entry == value)
            .map(|(_, factory)| *factory)
            .ok_or(DataAccessError::UnknownDiscriminator(value))?;

        Ok(factory())
    }
}
