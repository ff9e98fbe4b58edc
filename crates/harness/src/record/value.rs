//! Record values.
//!
//! A [`RecordValue`] is one concrete instance of a [`RecordSchema`]. It remembers
//! the schema it was built for so streams can infer their layout from a golden
//! vector, but equality only looks at the fields.

use std::fmt;
use std::sync::Arc;

use super::schema::RecordSchema;

/// A single field value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Signed integer.
    Int(i128),
    /// Unsigned integer.
    UInt(u128),
    /// Real number for fixed-point fields.
    Fixed(f64),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Nested record.
    Record(RecordValue),
}

impl Value {
    /// Short kind name used in diagnostics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Fixed(_) => "fixed",
            Self::Bytes(_) => "bytes",
            Self::Record(_) => "record",
        }
    }

    /// Numeric view, when the value is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Fixed(v) => Some(*v),
            Self::Bytes(_) | Self::Record(_) => None,
        }
    }

    /// Unsigned view of an integer value.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u128::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Signed view of an integer value.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i128::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Nested record, if this is one.
    pub const fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Int(_), Self::UInt(_)) | (Self::UInt(_), Self::Int(_)) => {
                self.as_i128().is_some() && self.as_i128() == other.as_i128()
            }
            (Self::Fixed(_), _) | (_, Self::Fixed(_)) => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Fixed(v) => write!(f, "{v}"),
            Self::Bytes(b) => {
                write!(f, "b\"")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "\"")
            }
            Self::Record(r) => write!(f, "{r}"),
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

value_from!(UInt, u128, u8, u16, u32, u64, u128, bool);
value_from!(Int, i128, i8, i16, i32, i64, i128);
value_from!(Fixed, f64, f32, f64);

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<RecordValue> for Value {
    fn from(v: RecordValue) -> Self {
        Self::Record(v)
    }
}

/// A concrete record: field values tagged with the schema they belong to.
#[derive(Debug, Clone)]
pub struct RecordValue {
    schema: Arc<RecordSchema>,
    fields: Vec<(String, Value)>,
}

impl RecordValue {
    /// Starts an empty value for `schema`. Fill it with [`RecordValue::set`].
    pub fn new(schema: &Arc<RecordSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            fields: Vec::with_capacity(schema.fields().len()),
        }
    }

    /// Sets field `name`, replacing any previous value.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// In-place version of [`RecordValue::set`].
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Schema this value was built for.
    pub const fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.schema.name())?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{name}: {value}")?;
        }
        write!(f, " }}")
    }
}
