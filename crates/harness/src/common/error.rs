//! Error definitions.
//!
//! This module defines the error types surfaced by the harness. It provides:
//! 1. **Codec errors:** Schema and value defects found while packing or unpacking.
//! 2. **Harness errors:** Stream construction, signal binding and golden-vector mismatches.
//! 3. **Config errors:** Failures while loading scenario files.
//!
//! Every error here is fatal to the test that raised it; nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by schema validation, `pack`, and `unpack`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A schema was declared without fields.
    #[error("record `{schema}` has no fields")]
    EmptyRecord {
        /// Name of the offending schema.
        schema: String,
    },

    /// A field was declared with zero bits.
    #[error("field `{field}` has zero width")]
    ZeroWidthField {
        /// Field name.
        field: String,
    },

    /// A numeric field is wider than its kind can encode exactly.
    #[error("field `{field}` is {width} bits wide; this kind supports at most {limit}")]
    UnsupportedWidth {
        /// Field name.
        field: String,
        /// Declared width.
        width: usize,
        /// Widest supported width for the field's kind.
        limit: usize,
    },

    /// An encoded value does not fit its declared width.
    #[error("value {value} of field `{field}` does not fit in {width} bits")]
    WidthMismatch {
        /// Field name.
        field: String,
        /// Declared width.
        width: usize,
        /// Rendered offending value.
        value: String,
    },

    /// A value's kind cannot be encoded by the field's kind.
    #[error("field `{field}` expects {expected}, got {found}")]
    InvalidFieldKind {
        /// Field name.
        field: String,
        /// Kind the schema declares.
        expected: String,
        /// Kind that was supplied.
        found: String,
    },

    /// The value has no entry for a schema field.
    #[error("record `{schema}` value is missing field `{field}`")]
    MissingField {
        /// Schema name.
        schema: String,
        /// Missing field name.
        field: String,
    },

    /// The value carries a field the schema does not declare.
    #[error("record `{schema}` has no field `{field}`")]
    UnknownField {
        /// Schema name.
        schema: String,
        /// Unknown field name.
        field: String,
    },

    /// Two fields of one schema share a name.
    #[error("record `{schema}` declares field `{field}` twice")]
    DuplicateField {
        /// Schema name.
        schema: String,
        /// Duplicated field name.
        field: String,
    },

    /// A fixed-point value was NaN or infinite.
    #[error("fixed-point field `{field}` got a non-finite value")]
    NonFinite {
        /// Field name.
        field: String,
    },

    /// A raw value does not fit a bit vector of the requested width.
    #[error("{value} does not fit in a {width}-bit vector")]
    BitWidth {
        /// Requested width.
        width: usize,
        /// Rendered value.
        value: String,
    },

    /// `unpack` received a vector whose width differs from the schema size.
    #[error("record `{schema}` is {expected} bits wide, got a {found}-bit vector")]
    VectorWidth {
        /// Schema name.
        schema: String,
        /// Schema size.
        expected: usize,
        /// Width of the vector supplied.
        found: usize,
    },
}

/// Errors raised by channels, producers, consumers, the simulator and the tester.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    /// A codec failure while encoding or decoding stream data.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Out-of-range construction parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The DUT does not expose a signal the channel needs.
    #[error("dut `{dut}` is missing the signal `{signal}`")]
    MissingSignal {
        /// DUT name.
        dut: String,
        /// Expected signal name.
        signal: String,
    },

    /// A DUT signal's width disagrees with the bound schema.
    #[error("signal `{signal}` is {found} bits wide, expected {expected}")]
    SignalWidthMismatch {
        /// Signal name.
        signal: String,
        /// Width implied by the schema.
        expected: usize,
        /// Width the DUT reports.
        found: usize,
    },

    /// A producer with a metadata channel was handed no metadata.
    #[error("stream `{stream}` requires metadata but none was given")]
    MissingMetadata {
        /// Stream name.
        stream: String,
    },

    /// A producer without a metadata channel was handed metadata.
    #[error("stream `{stream}` has no metadata channel")]
    UnexpectedMetadata {
        /// Stream name.
        stream: String,
    },

    /// Offered data changed before the handshake completed.
    #[error("stream `{stream}`: `{signal}` changed while offered at cycle {cycle}")]
    UnstableOffer {
        /// Stream name.
        stream: String,
        /// Signal that changed.
        signal: String,
        /// Edge at which the change was observed.
        cycle: u64,
    },

    /// An output stream was registered without expected data.
    #[error("output stream `{stream}` has no expected data to infer its schema from")]
    EmptyExpectedStream {
        /// Stream name.
        stream: String,
    },

    /// A stream with the same name and direction is already registered.
    #[error("stream `{stream}` is already registered")]
    DuplicateStream {
        /// Stream name.
        stream: String,
    },

    /// An output stream produced a different number of transactions than expected.
    #[error("stream `{stream}`: expected {expected} transactions, got {actual}")]
    LengthMismatch {
        /// Stream name.
        stream: String,
        /// Golden length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },

    /// Decoded data differs from the golden vector.
    #[error("stream `{stream}` data mismatch at index {index}: expected {expected}, got {actual}")]
    DataMismatch {
        /// Stream name.
        stream: String,
        /// Transaction index.
        index: usize,
        /// Rendered golden value.
        expected: String,
        /// Rendered decoded value.
        actual: String,
    },

    /// Decoded metadata differs from the golden vector.
    #[error(
        "stream `{stream}` metadata mismatch at index {index}: expected {expected}, got {actual}"
    )]
    MetadataMismatch {
        /// Stream name.
        stream: String,
        /// Transaction index.
        index: usize,
        /// Rendered golden metadata.
        expected: String,
        /// Rendered decoded metadata.
        actual: String,
    },

    /// A bounded wait ran out of cycles.
    #[error("timed out after {cycles} cycles; buffered per stream: {pending:?}")]
    Timeout {
        /// Cycles waited.
        cycles: u64,
        /// Transactions buffered on each output stream when the wait expired.
        pending: Vec<(String, usize)>,
    },

    /// A handle that does not belong to this simulator.
    #[error("no {kind} with handle {index}")]
    UnknownHandle {
        /// "producer" or "consumer".
        kind: &'static str,
        /// Handle index.
        index: usize,
    },
}

/// Errors raised while loading scenario configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The scenario file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The scenario is not valid JSON or does not match the schema.
    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),

    /// A stream references a schema that is not declared.
    #[error("unknown schema `{0}`")]
    UnknownSchema(String),

    /// A JSON value does not match the shape of its schema.
    #[error("value for `{field}` is not a valid {expected}")]
    ValueShape {
        /// Field path.
        field: String,
        /// Expected kind.
        expected: String,
    },

    /// Building the scenario failed.
    #[error(transparent)]
    Harness(#[from] HarnessError),
}
