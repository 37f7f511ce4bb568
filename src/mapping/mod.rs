//! Pure data + lookup helpers used to project rows onto records and output
//! parameters onto record properties. No I/O happens here.

mod output_map;
mod property_map;
mod record;
mod type_map;

pub use output_map::OutputParameterMap;
pub use property_map::{MappedProperty, PropertyMap};
pub use record::{FromRowValue, IntoRowValue, Record};
pub use type_map::TypeMap;

/// Lower-camel-case form of a field name, used for auto-generated parameter
/// names (`"RowVersion"` becomes `"rowVersion"`).
pub(crate) fn to_camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
