//! Reference design models.
//!
//! Small clocked designs implementing [`Dut`](crate::sim::dut::Dut), used by the
//! CLI scenarios and by tests in place of an external simulator.

/// Valid/ready FIFO stage.
pub mod fifo;

/// Width-checked signal storage.
pub mod signals;

pub use fifo::{FifoStage, Transform};
pub use signals::SignalTable;
