//! Record type reflection for gridtable
//!
//! The converter never knows a row layout ahead of time. Everything it
//! learns about a record comes from the descriptors defined here:
//!
//! - `FieldKind` is closed, so every dispatch over it is exhaustive
//! - `FieldDescriptor` carries export name, import aliases and static arity
//! - `RecordType` fixes the slot layout instances are built from
//! - `SchemaLoader` resolves definition files into shared descriptors

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{EnumDef, FieldDef, FieldTypeDef, SchemaFile, SchemaLoader, StructDef, SymbolDef};
pub use types::{EnumSymbol, EnumType, FieldDescriptor, FieldKind, FloatWidth, IntWidth, RecordType};
