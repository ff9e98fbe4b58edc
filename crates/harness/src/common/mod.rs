//! Common utilities and types used throughout the harness.
//!
//! This module provides the building blocks shared by the codec and the stream engine:
//! 1. **Bit Vectors:** The fixed-width wire representation of records and signals.
//! 2. **Fixed Point:** Quantization and tolerance helpers for fixed-point fields.
//! 3. **Error Handling:** Codec, harness and configuration error types.

/// Arbitrary-width bit vectors.
pub mod bits;

/// Error types for the codec, stream engine and configuration.
pub mod error;

/// Fixed-point and Gray-code helpers.
pub mod fixed;

pub use bits::BitVector;
pub use error::{CodecError, ConfigError, HarnessError};
