use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::DataAccessError;
use crate::types::RowValue;

/// Field-level access to a record's mapped columns.
///
/// Each record type describes its primitive leaf paths (dotted for nested
/// records, e.g. `"CellPhone.AreaCode"`) and exposes get/assign by path.
/// Plain structs get an impl from the [`crate::impl_record!`] macro;
/// polymorphic enums implement the trait by hand, routing per variant.
pub trait Record: Send {
    /// Primitive leaf paths in declaration order.
    fn static_paths() -> &'static [String]
    where
        Self: Sized;

    /// Same paths, callable through `dyn Record`.
    fn paths(&self) -> &'static [String];

    /// Read the current value of a primitive field. `None` for unknown paths.
    fn field(&self, path: &str) -> Option<RowValue>;

    /// Assign a primitive field. Dotted paths reach into nested records,
    /// creating them on first assignment.
    fn assign(&mut self, path: &str, value: RowValue) -> Result<(), DataAccessError>;
}

/// Conversion from a field's native type into a [`RowValue`].
pub trait IntoRowValue {
    fn to_row_value(&self) -> RowValue;
}

/// Conversion from a [`RowValue`] cell into a field's native type.
pub trait FromRowValue: Sized {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError>;
}

fn mismatch<T>(expected: &str, value: &RowValue) -> Result<T, DataAccessError> {
    Err(DataAccessError::MappingError(format!(
        "cannot assign {value:?} to a {expected} field"
    )))
}

impl IntoRowValue for i64 {
    fn to_row_value(&self) -> RowValue {
        RowValue::Int(*self)
    }
}

impl FromRowValue for i64 {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Int(v) => Ok(v),
            other => mismatch("i64", &other),
        }
    }
}

impl IntoRowValue for i32 {
    fn to_row_value(&self) -> RowValue {
        RowValue::Int(i64::from(*self))
    }
}

impl FromRowValue for i32 {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Int(v) => i32::try_from(v).map_err(|_| {
                DataAccessError::MappingError(format!("value {v} does not fit in an i32 field"))
            }),
            other => mismatch("i32", &other),
        }
    }
}

impl IntoRowValue for f64 {
    fn to_row_value(&self) -> RowValue {
        RowValue::Float(*self)
    }
}

impl FromRowValue for f64 {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Float(v) => Ok(v),
            RowValue::Int(v) => Ok(v as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl IntoRowValue for String {
    fn to_row_value(&self) -> RowValue {
        RowValue::Text(self.clone())
    }
}

impl FromRowValue for String {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Text(v) => Ok(v),
            other => mismatch("String", &other),
        }
    }
}

impl IntoRowValue for bool {
    fn to_row_value(&self) -> RowValue {
        RowValue::Bool(*self)
    }
}

impl FromRowValue for bool {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Bool(v) => Ok(v),
            RowValue::Int(0) => Ok(false),
            RowValue::Int(1) => Ok(true),
            other => mismatch("bool", &other),
        }
    }
}

impl IntoRowValue for NaiveDateTime {
    fn to_row_value(&self) -> RowValue {
        RowValue::Timestamp(*self)
    }
}

impl FromRowValue for NaiveDateTime {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value.as_timestamp() {
            Some(v) => Ok(v),
            None => mismatch("timestamp", &value),
        }
    }
}

impl IntoRowValue for Vec<u8> {
    fn to_row_value(&self) -> RowValue {
        RowValue::Blob(self.clone())
    }
}

impl FromRowValue for Vec<u8> {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Blob(v) => Ok(v),
            other => mismatch("blob", &other),
        }
    }
}

impl IntoRowValue for JsonValue {
    fn to_row_value(&self) -> RowValue {
        RowValue::Json(self.clone())
    }
}

impl FromRowValue for JsonValue {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Json(v) => Ok(v),
            other => mismatch("json", &other),
        }
    }
}

impl<T: IntoRowValue> IntoRowValue for Option<T> {
    fn to_row_value(&self) -> RowValue {
        match self {
            Some(inner) => inner.to_row_value(),
            None => RowValue::Null,
        }
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    fn from_row_value(value: RowValue) -> Result<Self, DataAccessError> {
        match value {
            RowValue::Null => Ok(None),
            other => T::from_row_value(other).map(Some),
        }
    }
}

/// Implements [`Record`] for a plain struct, mapping each field to its column
/// name. Nested record fields must be `Option<N>` where `N: Record + Default`;
/// their columns are addressed with a dotted prefix:
///
/// ```rust
/// use sql_access::impl_record;
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct PhoneNumber {
///     area_code: Option<String>,
///     number: Option<String>,
/// }
///
/// #[derive(Debug, Default)]
/// struct Person {
///     name: Option<String>,
///     cell_phone: Option<PhoneNumber>,
/// }
///
/// impl_record! {
///     PhoneNumber {
///         fields { area_code => "AreaCode", number => "Number" }
///     }
/// }
///
/// impl_record! {
///     Person {
///         fields { name => "Name" }
///         nested { cell_phone: PhoneNumber => "CellPhone" }
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $ty:ty {
            fields { $( $field:ident => $column:literal ),* $(,)? }
            $( nested { $( $nested_field:ident : $nested_ty:ty => $prefix:literal ),* $(,)? } )?
        }
    ) => {
        impl $crate::mapping::Record for $ty {
            fn static_paths() -> &'static [String] {
                static PATHS: ::std::sync::LazyLock<Vec<String>> =
                    ::std::sync::LazyLock::new(|| {
                        let mut paths: Vec<String> = Vec::new();
                        $( paths.push($column.to_string()); )*
                        $( $(
                            for sub in <$nested_ty as $crate::mapping::Record>::static_paths() {
                                paths.push(format!(concat!($prefix, ".{}"), sub));
                            }
                        )* )?
                        paths
                    });
                &PATHS
            }

            fn paths(&self) -> &'static [String] {
                <Self as $crate::mapping::Record>::static_paths()
            }

            fn field(&self, path: &str) -> Option<$crate::types::RowValue> {
                match path {
                    $( $column => Some($crate::mapping::IntoRowValue::to_row_value(&self.$field)), )*
                    _ => {
                        $( $(
                            if let Some(rest) = path.strip_prefix(concat!($prefix, ".")) {
                                return self.$nested_field.as_ref().and_then(|nested| {
                                    $crate::mapping::Record::field(nested, rest)
                                });
                            }
                        )* )?
                        None
                    }
                }
            }

            fn assign(
                &mut self,
                path: &str,
                value: $crate::types::RowValue,
            ) -> Result<(), $crate::error::DataAccessError> {
                match path {
                    $( $column => {
                        self.$field = $crate::mapping::FromRowValue::from_row_value(value)?;
                        Ok(())
                    } )*
                    _ => {
                        $( $(
                            if let Some(rest) = path.strip_prefix(concat!($prefix, ".")) {
                                return $crate::mapping::Record::assign(
                                    self.$nested_field.get_or_insert_with(Default::default),
                                    rest,
                                    value,
                                );
                            }
                        )* )?
                        Err($crate::error::DataAccessError::MappingError(format!(
                            "unknown field path: {path}"
                        )))
                    }
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct PhoneNumber {
        area_code: Option<String>,
        exchange: Option<String>,
        number: Option<String>,
    }

    #[derive(Debug, Default)]
    struct Person {
        name: Option<String>,
        age: Option<i64>,
        cell_phone: Option<PhoneNumber>,
    }

    impl_record! {
        PhoneNumber {
            fields {
                area_code => "AreaCode",
                exchange => "Exchange",
                number => "Number",
            }
        }
    }

    impl_record! {
        Person {
            fields {
                name => "Name",
                age => "Age",
            }
            nested {
                cell_phone: PhoneNumber => "CellPhone",
            }
        }
    }

    #[test]
    fn paths_include_dotted_nested_leaves() {
        assert_eq!(
            Person::static_paths(),
            &[
                "Name".to_string(),
                "Age".to_string(),
                "CellPhone.AreaCode".to_string(),
                "CellPhone.Exchange".to_string(),
                "CellPhone.Number".to_string(),
            ]
        );
    }

    #[test]
    fn dotted_assignment_creates_the_nested_record() {
        let mut person = Person::default();
        person
            .assign("CellPhone.AreaCode", RowValue::Text("305".into()))
            .unwrap();
        person
            .assign("CellPhone.Number", RowValue::Text("1234".into()))
            .unwrap();

        let phone = person.cell_phone.as_ref().unwrap();
        assert_eq!(phone.area_code.as_deref(), Some("305"));
        assert_eq!(phone.number.as_deref(), Some("1234"));
        assert_eq!(
            person.field("CellPhone.AreaCode"),
            Some(RowValue::Text("305".into()))
        );
    }

    #[test]
    fn nested_record_is_absent_until_assigned() {
        let person = Person::default();
        assert!(person.cell_phone.is_none());
        assert_eq!(person.field("CellPhone.AreaCode"), None);
    }

    #[test]
    fn null_assignment_clears_an_optional_field() {
        let mut person = Person {
            name: Some("x".into()),
            ..Person::default()
        };
        person.assign("Name", RowValue::Null).unwrap();
        assert_eq!(person.name, None);
    }

    #[test]
    fn unknown_path_is_a_mapping_error() {
        let mut person = Person::default();
        assert!(matches!(
            person.assign("Nope", RowValue::Int(1)),
            Err(DataAccessError::MappingError(_))
        ));
    }
}
