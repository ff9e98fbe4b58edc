//! Record schemas.
//!
//! A schema is an ordered list of fields. The first declared field occupies the
//! most significant bits of the packed vector. Schemas are built once, validated
//! at construction, and shared through `Arc` when nested.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::common::error::CodecError;
use crate::common::fixed::{DEFAULT_FIXED_WIDTH, DEFAULT_FRACTIONAL_BITS};

/// Widest numeric field the codec supports.
pub const MAX_NUMERIC_WIDTH: usize = 128;

/// Widest fixed-point field; wider words cannot round-trip through an `f64` mantissa.
pub const MAX_FIXED_WIDTH: usize = 53;

/// Byte order of a byte-string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// First byte is the most significant.
    #[default]
    Big,
    /// First byte is the least significant.
    Little,
}

/// How a field's bits are interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Two's-complement integer.
    SignedInt,
    /// Plain binary integer.
    UnsignedInt,
    /// Signed integer scaled by `2^fractional_bits`.
    FixedPoint {
        /// Number of fractional bits.
        fractional_bits: u32,
    },
    /// Raw bytes.
    ByteString {
        /// Order of the bytes on the wire.
        byte_order: ByteOrder,
    },
    /// Another record packed in place.
    Nested(Arc<RecordSchema>),
}

impl FieldKind {
    /// Short human-readable name used in diagnostics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SignedInt => "int",
            Self::UnsignedInt => "uint",
            Self::FixedPoint { .. } => "fixed",
            Self::ByteString { .. } => "bytes",
            Self::Nested(_) => "record",
        }
    }
}

/// A named field of a fixed bit width.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name, unique within its schema.
    pub name: String,
    /// Width in bits.
    pub width: usize,
    /// Interpretation of the bits.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Unsigned integer field.
    pub fn uint(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
            kind: FieldKind::UnsignedInt,
        }
    }

    /// Signed (two's-complement) integer field.
    pub fn int(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
            kind: FieldKind::SignedInt,
        }
    }

    /// Fixed-point field with `fractional_bits` fractional bits.
    pub fn fixed(name: impl Into<String>, width: usize, fractional_bits: u32) -> Self {
        Self {
            name: name.into(),
            width,
            kind: FieldKind::FixedPoint { fractional_bits },
        }
    }

    /// Fixed-point field in the design's default 25-bit, 14-fraction format.
    pub fn fixed_default(name: impl Into<String>) -> Self {
        Self::fixed(name, DEFAULT_FIXED_WIDTH, DEFAULT_FRACTIONAL_BITS)
    }

    /// Byte-string field.
    pub fn bytes(name: impl Into<String>, width: usize, byte_order: ByteOrder) -> Self {
        Self {
            name: name.into(),
            width,
            kind: FieldKind::ByteString { byte_order },
        }
    }

    /// Nested record field; its width is the nested schema's size.
    pub fn nested(name: impl Into<String>, schema: &Arc<RecordSchema>) -> Self {
        Self {
            name: name.into(),
            width: schema.size(),
            kind: FieldKind::Nested(Arc::clone(schema)),
        }
    }
}

/// An ordered, non-empty field layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldSpec>,
    size: usize,
}

impl RecordSchema {
    /// Validates `fields` and builds a schema.
    ///
    /// # Errors
    ///
    /// * [`CodecError::EmptyRecord`] when `fields` is empty.
    /// * [`CodecError::ZeroWidthField`] for a zero-width field.
    /// * [`CodecError::UnsupportedWidth`] for integer fields wider than 128 bits or
    ///   fixed-point fields wider than 53.
    /// * [`CodecError::WidthMismatch`] when a nested field's width differs from its schema
    ///   or a fixed-point field has more fractional bits than total bits.
    /// * [`CodecError::DuplicateField`] when two fields share a name.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, CodecError> {
        let name = name.into();
        if fields.is_empty() {
            return Err(CodecError::EmptyRecord { schema: name });
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CodecError::DuplicateField {
                    schema: name,
                    field: field.name.clone(),
                });
            }
            validate_field(field)?;
        }

        let size = fields.iter().map(|f| f.width).sum();
        Ok(Self { name, fields, size })
    }

    /// Same as [`RecordSchema::new`], wrapped for sharing and nesting.
    ///
    /// # Errors
    ///
    /// See [`RecordSchema::new`].
    pub fn shared(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Arc<Self>, CodecError> {
        Self::new(name, fields).map(Arc::new)
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Packed width in bits.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Flattened bit layout, one entry per leaf field, most significant first.
    ///
    /// Nested fields are expanded with dotted paths (`vertex.position.x`).
    pub fn layout(&self) -> Vec<FieldLayout> {
        let mut out = Vec::new();
        self.collect_layout("", self.size, &mut out);
        out
    }

    fn collect_layout(&self, prefix: &str, top: usize, out: &mut Vec<FieldLayout>) {
        let mut hi = top;
        for field in &self.fields {
            hi -= field.width;
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{prefix}.{}", field.name)
            };
            match &field.kind {
                FieldKind::Nested(inner) => inner.collect_layout(&path, hi + field.width, out),
                kind => out.push(FieldLayout {
                    path,
                    lsb: hi,
                    width: field.width,
                    kind: kind.label(),
                }),
            }
        }
    }
}

fn validate_field(field: &FieldSpec) -> Result<(), CodecError> {
    if field.width == 0 {
        return Err(CodecError::ZeroWidthField {
            field: field.name.clone(),
        });
    }
    match &field.kind {
        FieldKind::SignedInt | FieldKind::UnsignedInt if field.width > MAX_NUMERIC_WIDTH => {
            Err(CodecError::UnsupportedWidth {
                field: field.name.clone(),
                width: field.width,
                limit: MAX_NUMERIC_WIDTH,
            })
        }
        FieldKind::FixedPoint { .. } if field.width > MAX_FIXED_WIDTH => {
            Err(CodecError::UnsupportedWidth {
                field: field.name.clone(),
                width: field.width,
                limit: MAX_FIXED_WIDTH,
            })
        }
        FieldKind::FixedPoint { fractional_bits } if *fractional_bits as usize > field.width => {
            Err(CodecError::WidthMismatch {
                field: field.name.clone(),
                width: field.width,
                value: format!("{fractional_bits} fractional bits"),
            })
        }
        FieldKind::Nested(inner) if inner.size() != field.width => Err(CodecError::WidthMismatch {
            field: field.name.clone(),
            width: field.width,
            value: format!("record `{}` of {} bits", inner.name(), inner.size()),
        }),
        _ => Ok(()),
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            match &field.kind {
                FieldKind::Nested(inner) => write!(f, "{sep}{}: {}", field.name, inner.name())?,
                kind => write!(f, "{sep}{}: {}({})", field.name, kind.label(), field.width)?,
            }
        }
        write!(f, " }}")
    }
}

/// One leaf field's position in the packed vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Dotted field path.
    pub path: String,
    /// Index of the field's least significant bit.
    pub lsb: usize,
    /// Width in bits.
    pub width: usize,
    /// Kind label.
    pub kind: &'static str,
}

/// Wire form of a schema in scenario files.
#[derive(Debug, Deserialize)]
struct RawSchema {
    name: String,
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    kind: String,
    #[serde(default)]
    width: Option<usize>,
    #[serde(default)]
    fractional_bits: Option<u32>,
    #[serde(default)]
    byte_order: ByteOrder,
    #[serde(default)]
    schema: Option<Box<RawSchema>>,
}

impl TryFrom<RawSchema> for RecordSchema {
    type Error = CodecError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        let fields = raw
            .fields
            .into_iter()
            .map(RawField::into_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(raw.name, fields)
    }
}

impl RawField {
    fn into_spec(self) -> Result<FieldSpec, CodecError> {
        let width = self.width.unwrap_or(0);
        match self.kind.as_str() {
            "uint" => Ok(FieldSpec::uint(self.name, width)),
            "int" => Ok(FieldSpec::int(self.name, width)),
            "fixed" => Ok(FieldSpec::fixed(
                self.name,
                self.width.unwrap_or(DEFAULT_FIXED_WIDTH),
                self.fractional_bits.unwrap_or(DEFAULT_FRACTIONAL_BITS),
            )),
            "bytes" => Ok(FieldSpec::bytes(self.name, width, self.byte_order)),
            "record" | "nested" => {
                let Some(raw) = self.schema else {
                    return Err(CodecError::InvalidFieldKind {
                        field: self.name,
                        expected: "an inline `schema`".to_string(),
                        found: "nothing".to_string(),
                    });
                };
                let inner = Arc::new(RecordSchema::try_from(*raw)?);
                let mut spec = FieldSpec::nested(self.name, &inner);
                if let Some(declared) = self.width {
                    spec.width = declared;
                }
                Ok(spec)
            }
            other => Err(CodecError::InvalidFieldKind {
                field: self.name,
                expected: "one of uint, int, fixed, bytes, record".to_string(),
                found: format!("`{other}`"),
            }),
        }
    }
}
