use std::collections::{HashMap, HashSet};

/// One entry of an explicit property map: a logical field name, an optional
/// explicit column index, and an ignore flag.
#[derive(Debug, Clone)]
pub struct MappedProperty {
    pub(crate) name: String,
    pub(crate) index: Option<usize>,
    pub(crate) ignore: bool,
}

impl MappedProperty {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            ignore: false,
        }
    }

    /// Pin this property to an explicit column index, overriding its position
    /// in the supplied list.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// An ignored property is never resolved and never raises a missing
    /// mapping.
    pub fn ignored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            ignore: true,
        }
    }
}

/// Projects row columns onto record fields by name.
///
/// Built once per command or result set: either supplied explicitly, or
/// inferred from the first row's column names with `index = position`.
/// Lookups of unmapped names return `None` and callers skip the assignment;
/// the map is deliberately best-effort.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    map: HashMap<String, usize>,
    ignored: HashSet<String>,
}

impl PropertyMap {
    pub fn new(properties: impl IntoIterator<Item = MappedProperty>) -> Self {
        let mut map = HashMap::new();
        let mut ignored = HashSet::new();

        for (position, property) in properties.into_iter().enumerate() {
            // An explicit index overrides the position in the list
            let index = property.index.unwrap_or(position);

            if property.ignore {
                ignored.insert(property.name);
            } else {
                map.insert(property.name, index);
            }
        }

        Self { map, ignored }
    }

    /// Infer a map from row column names, positionally.
    pub fn infer<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| MappedProperty::named(name.as_ref()).index(i)),
        )
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_index_overrides_position() {
        let map = PropertyMap::new([
            MappedProperty::named("A"),
            MappedProperty::named("B").index(7),
            MappedProperty::named("C"),
        ]);
        assert_eq!(map.index_of("A"), Some(0));
        assert_eq!(map.index_of("B"), Some(7));
        assert_eq!(map.index_of("C"), Some(2));
    }

    #[test]
    fn ignored_names_are_never_resolved() {
        let map = PropertyMap::new([
            MappedProperty::named("A"),
            MappedProperty::ignored("Secret"),
        ]);
        assert!(map.is_ignored("Secret"));
        assert_eq!(map.index_of("Secret"), None);
    }

    #[test]
    fn unmapped_name_is_none_not_an_error() {
        let map = PropertyMap::new([MappedProperty::named("A")]);
        assert_eq!(map.index_of("Missing"), None);
        assert!(!map.is_ignored("Missing"));
    }

    #[test]
    fn inference_is_idempotent() {
        let columns = ["Id", "Name", "Age"];
        let first = PropertyMap::infer(&columns);
        let second = PropertyMap::infer(&columns);
        for (i, column) in columns.iter().enumerate() {
            assert_eq!(first.index_of(column), Some(i));
            assert_eq!(first.index_of(column), second.index_of(column));
        }
    }
}
