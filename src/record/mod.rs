//! Record values for gridtable
//!
//! A row is a `RecordInstance`: a slot arena shaped by its `RecordType`.
//! Slots hold `FieldValue`s; sets and maps are hashed containers that are
//! filled in bulk and rehashed once. The `text` module converts values to
//! and from the parenthesised text form used for string cells.

mod instance;
mod text;
mod value;

pub use instance::RecordInstance;
pub use text::{
    assign_from_string, enum_value, int_in_width, parse_text, to_text, validate_name, CoercionError,
    INVALID_NAME_CHARS,
};
pub use value::{FieldValue, MapValue, SetValue};
