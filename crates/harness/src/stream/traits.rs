//! Stream agent interface.
//!
//! Producers and consumers are explicit state machines advanced by the simulator.
//! Each cycle has two phases:
//! 1. **Drive:** Agents schedule signal writes; the simulator applies them together.
//! 2. **Sample:** At the active edge, agents observe the values visible before the
//!    edge and advance their handshake state.

use crate::common::error::HarnessError;
use crate::sim::dut::{Dut, WriteQueue};

use super::channel::Channel;
use super::transaction::StreamStats;

/// A valid/ready agent attached to one channel.
pub trait StreamAgent {
    /// Stream name.
    fn name(&self) -> &str {
        self.channel().name()
    }

    /// The channel the agent owns.
    fn channel(&self) -> &Channel;

    /// Schedules this cycle's signal writes.
    fn drive(&mut self, writes: &mut WriteQueue);

    /// Observes the design at active edge `cycle`.
    ///
    /// # Errors
    ///
    /// Fails on codec errors, missing signals, or unstable offers.
    fn sample(&mut self, dut: &dyn Dut, cycle: u64) -> Result<(), HarnessError>;

    /// Handshake statistics so far.
    fn stats(&self) -> &StreamStats;
}
