//! Structured records and their bit-level codec.
//!
//! This module describes typed, possibly nested records and converts them to and
//! from fixed-width bit vectors:
//! 1. **Schema:** Field names, widths and kinds, validated at construction.
//! 2. **Value:** Concrete field values tagged with their schema.
//! 3. **Codec:** `size`, `pack` and `unpack`.

/// Bit-level encoding and decoding of records.
pub mod codec;

/// JSON conversion of record values.
mod json;

/// Field layouts.
pub mod schema;

/// Record and field values.
pub mod value;

pub use codec::{pack, size, unpack};
pub use schema::{
    ByteOrder, FieldKind, FieldLayout, FieldSpec, MAX_FIXED_WIDTH, MAX_NUMERIC_WIDTH, RecordSchema,
};
pub use value::{RecordValue, Value};
