//! Cycle-accurate stream verification harness.
//!
//! This crate drives and checks clocked designs that exchange structured records
//! over valid/ready handshakes. It provides the following:
//! 1. **Records:** Typed, nested schemas and a bit-exact `pack`/`unpack` codec.
//! 2. **Streams:** Producers and consumers with backpressure and throughput shaping.
//! 3. **Simulation:** A cycle-stepped kernel around a `Dut` trait and a golden-vector tester.
//! 4. **Models:** Reference designs (a valid/ready FIFO stage) for tests and scenarios.
//! 5. **Configuration:** JSON scenarios, stream options and defaults.

/// Common types (bit vectors, fixed-point helpers, errors).
pub mod common;
/// Harness configuration (defaults, stream options, JSON scenarios).
pub mod config;
/// Reference design models.
pub mod models;
/// Record schemas, values and the bit-level codec.
pub mod record;
/// Simulation kernel (DUT trait, simulator, tester, reports).
pub mod sim;
/// Valid/ready stream agents.
pub mod stream;

/// Fixed-width wire representation of records and signals.
pub use crate::common::BitVector;
/// Error types; `HarnessError` is what stream and tester operations return.
pub use crate::common::{CodecError, ConfigError, HarnessError};
/// Shared settings; use `HarnessConfig::default()` or deserialize from JSON.
pub use crate::config::{HarnessConfig, ScenarioConfig, StreamOptions};
/// Record model and codec entry points.
pub use crate::record::{FieldKind, FieldSpec, RecordSchema, RecordValue, Value, pack, size, unpack};
/// Simulation entry points.
pub use crate::sim::{Dut, PipelineTester, Simulator, TestReport};
