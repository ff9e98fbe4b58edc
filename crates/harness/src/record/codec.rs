//! Record bit codec.
//!
//! Converts between [`RecordValue`]s and packed [`BitVector`]s. It provides:
//! 1. **Sizing:** `size` sums field widths, recursing into nested records.
//! 2. **Packing:** Fields are concatenated in declaration order, first field in the MSBs.
//! 3. **Unpacking:** Fields are consumed from the least significant end of the vector.
//!
//! `unpack(schema, pack(schema, v)) == v` holds for every value inside its
//! fields' legal domains; the stream engine relies on it.

use std::sync::Arc;

use crate::common::bits::{BitVector, signed_fits};
use crate::common::error::CodecError;
use crate::common::fixed;

use super::schema::{ByteOrder, FieldKind, FieldSpec, RecordSchema};
use super::value::{RecordValue, Value};

/// Packed width of `schema` in bits.
///
/// # Errors
///
/// Returns [`CodecError::EmptyRecord`] when the schema, or any nested schema, has no fields.
pub fn size(schema: &RecordSchema) -> Result<usize, CodecError> {
    if schema.fields().is_empty() {
        return Err(CodecError::EmptyRecord {
            schema: schema.name().to_string(),
        });
    }
    schema.fields().iter().try_fold(0usize, |acc, field| {
        let width = match &field.kind {
            FieldKind::Nested(inner) => size(inner)?,
            _ => field.width,
        };
        Ok(acc + width)
    })
}

/// Encodes `value` as a `size(schema)`-bit vector.
///
/// # Errors
///
/// * [`CodecError::MissingField`] / [`CodecError::UnknownField`] when the value's
///   field names do not match the schema.
/// * [`CodecError::WidthMismatch`] when a field's value does not fit its width.
/// * [`CodecError::InvalidFieldKind`] when a value cannot be encoded as the field's kind.
/// * [`CodecError::NonFinite`] for NaN or infinite fixed-point values.
pub fn pack(schema: &RecordSchema, value: &RecordValue) -> Result<BitVector, CodecError> {
    if let Some((unknown, _)) = value
        .fields()
        .iter()
        .find(|(name, _)| schema.field(name).is_none())
    {
        return Err(CodecError::UnknownField {
            schema: schema.name().to_string(),
            field: unknown.clone(),
        });
    }

    let parts = schema
        .fields()
        .iter()
        .map(|field| {
            let v = value.get(&field.name).ok_or_else(|| CodecError::MissingField {
                schema: schema.name().to_string(),
                field: field.name.clone(),
            })?;
            encode_field(field, v)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if parts.is_empty() {
        return Err(CodecError::EmptyRecord {
            schema: schema.name().to_string(),
        });
    }
    Ok(BitVector::concat(&parts))
}

/// Decodes a `size(schema)`-bit vector into a value of `schema`.
///
/// # Errors
///
/// * [`CodecError::VectorWidth`] when `bits` is not exactly `size(schema)` wide.
/// * [`CodecError::EmptyRecord`] for an empty schema.
pub fn unpack(schema: &Arc<RecordSchema>, bits: &BitVector) -> Result<RecordValue, CodecError> {
    let expected = size(schema)?;
    if bits.width() != expected {
        return Err(CodecError::VectorWidth {
            schema: schema.name().to_string(),
            expected,
            found: bits.width(),
        });
    }

    let mut decoded = Vec::with_capacity(schema.fields().len());
    let mut lsb = 0;
    for field in schema.fields().iter().rev() {
        let slice = bits.slice(lsb, field.width);
        decoded.push((field.name.as_str(), decode_field(field, &slice)?));
        lsb += field.width;
    }

    let mut value = RecordValue::new(schema);
    for (name, v) in decoded.into_iter().rev() {
        value.insert(name, v);
    }
    Ok(value)
}

fn encode_field(field: &FieldSpec, value: &Value) -> Result<BitVector, CodecError> {
    let width = field.width;
    let overflow = |rendered: String| CodecError::WidthMismatch {
        field: field.name.clone(),
        width,
        value: rendered,
    };

    match &field.kind {
        FieldKind::UnsignedInt => {
            let v = value.as_u128().ok_or_else(|| wrong_kind(field, value))?;
            BitVector::from_u128(width, v).map_err(|_| overflow(v.to_string()))
        }
        FieldKind::SignedInt => {
            let v = value.as_i128().ok_or_else(|| wrong_kind(field, value))?;
            BitVector::from_i128(width, v).map_err(|_| overflow(v.to_string()))
        }
        FieldKind::FixedPoint { fractional_bits } => {
            let real = value.as_f64().ok_or_else(|| wrong_kind(field, value))?;
            if !real.is_finite() {
                return Err(CodecError::NonFinite {
                    field: field.name.clone(),
                });
            }
            let scaled = real * f64::from(*fractional_bits).exp2();
            if scaled.abs() >= 2f64.powi(127) {
                return Err(overflow(real.to_string()));
            }
            let raw = fixed::to_fixed(real, *fractional_bits);
            if !signed_fits(width, raw) {
                return Err(overflow(real.to_string()));
            }
            BitVector::from_i128(width, raw).map_err(|_| overflow(real.to_string()))
        }
        FieldKind::ByteString { byte_order } => {
            let Value::Bytes(bytes) = value else {
                return Err(wrong_kind(field, value));
            };
            let packed = match byte_order {
                ByteOrder::Big => BitVector::from_be_bytes(width, bytes),
                ByteOrder::Little => BitVector::from_le_bytes(width, bytes),
            };
            packed.map_err(|_| overflow(format!("{} bytes", bytes.len())))
        }
        FieldKind::Nested(inner) => {
            let Value::Record(record) = value else {
                return Err(wrong_kind(field, value));
            };
            pack(inner, record)
        }
    }
}

fn decode_field(field: &FieldSpec, bits: &BitVector) -> Result<Value, CodecError> {
    Ok(match &field.kind {
        FieldKind::UnsignedInt => Value::UInt(bits.to_u128()),
        FieldKind::SignedInt => Value::Int(bits.to_i128()),
        FieldKind::FixedPoint { fractional_bits } => {
            Value::Fixed(fixed::to_float(bits.to_i128(), *fractional_bits))
        }
        FieldKind::ByteString { byte_order } => Value::Bytes(match byte_order {
            ByteOrder::Big => bits.to_be_bytes(),
            ByteOrder::Little => bits.to_le_bytes(),
        }),
        FieldKind::Nested(inner) => Value::Record(unpack(inner, bits)?),
    })
}

fn wrong_kind(field: &FieldSpec, value: &Value) -> CodecError {
    let expected = match &field.kind {
        FieldKind::UnsignedInt => format!("a non-negative integer of {} bits", field.width),
        FieldKind::SignedInt => format!("a signed integer of {} bits", field.width),
        kind => kind.label().to_string(),
    };
    CodecError::InvalidFieldKind {
        field: field.name.clone(),
        expected,
        found: value.label().to_string(),
    }
}
