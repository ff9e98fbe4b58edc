//! Simulation kernel.
//!
//! Provides the design interface, the cycle-stepped simulator that advances
//! stream agents, and the golden-vector tester built on top of it.

/// Design-under-test trait and non-blocking write model.
pub mod dut;

/// Tester run results.
pub mod report;

/// Cycle-stepped simulator.
pub mod simulator;

/// Golden-vector tester.
pub mod tester;

pub use dut::{Dut, WriteQueue};
pub use report::{StreamReport, TestReport};
pub use simulator::{ConsumerId, ProducerId, Simulator};
pub use tester::PipelineTester;
