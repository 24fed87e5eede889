pub mod entity_kind;
pub mod field_map;

pub use entity_kind::EntityKind;
pub use field_map::{FieldMap, RawValue};
