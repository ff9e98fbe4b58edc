//! Valid/ready stream agents.
//!
//! This module implements both sides of the handshake protocol. It provides:
//! 1. **Channels:** Signal naming and width checks for one handshake port.
//! 2. **Producers:** Drive queued records into the design with backpressure.
//! 3. **Consumers:** Accept records from the design with throughput shaping.
//! 4. **Transactions:** Accepted items, cycle stamps and statistics.

/// Signal naming and binding of handshake ports.
pub mod channel;

/// Output-side agent.
pub mod consumer;

/// Input-side agent.
pub mod producer;

/// Agent interface driven by the simulator.
pub mod traits;

/// Accepted items and statistics.
pub mod transaction;

pub use channel::{Channel, ChannelSignals, Direction, SignalStyle};
pub use consumer::{Consumer, SampleState};
pub use producer::{DriveState, Producer};
pub use traits::StreamAgent;
pub use transaction::{StreamStats, Transaction};
