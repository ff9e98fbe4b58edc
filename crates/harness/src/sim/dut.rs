//! Design-under-test interface.
//!
//! This module defines the contract between the harness and a clocked design. It provides:
//! 1. **Signal Access:** Named, width-checked reads and writes of bit-vector signals.
//! 2. **Clocking:** An active-edge update and a combinational settle step.
//! 3. **Write Model:** A non-blocking write queue so one authoritative value reaches
//!    each signal per cycle.
//!
//! The design itself is an external collaborator; the harness only relies on this trait.

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::common::bits::BitVector;
use crate::common::error::HarnessError;

/// A clocked design exposing named signals.
///
/// Clock and reset are owned by the implementor and assumed to be running and
/// released before any stream agent is attached.
pub trait Dut: fmt::Debug {
    /// Short instance name used in diagnostics.
    fn name(&self) -> &str;

    /// Width of `signal` in bits, or `None` if the design has no such signal.
    fn signal_width(&self, signal: &str) -> Option<usize>;

    /// Current value of `signal`.
    fn read(&self, signal: &str) -> Option<BitVector>;

    /// Drives `signal` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MissingSignal`] for unknown signals and
    /// [`HarnessError::SignalWidthMismatch`] when `value` has the wrong width.
    fn write(&mut self, signal: &str, value: BitVector) -> Result<(), HarnessError>;

    /// Applies one active clock edge. Sequential state updates from the
    /// values visible before the edge.
    fn clock_edge(&mut self);

    /// Re-evaluates combinational outputs after inputs or state changed.
    fn settle(&mut self) {}
}

impl<T: Dut + ?Sized> Dut for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn signal_width(&self, signal: &str) -> Option<usize> {
        (**self).signal_width(signal)
    }

    fn read(&self, signal: &str) -> Option<BitVector> {
        (**self).read(signal)
    }

    fn write(&mut self, signal: &str, value: BitVector) -> Result<(), HarnessError> {
        (**self).write(signal, value)
    }

    fn clock_edge(&mut self) {
        (**self).clock_edge();
    }

    fn settle(&mut self) {
        (**self).settle();
    }
}

/// Signal writes scheduled during one drive phase.
///
/// Writes are applied together, in scheduling order, after every agent has
/// driven. Two writes to the same signal in one cycle are last-write-wins.
#[derive(Debug, Default)]
pub struct WriteQueue {
    pending: Vec<(String, BitVector)>,
}

impl WriteQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `signal <= value` for the end of the drive phase.
    pub fn schedule(&mut self, signal: &str, value: BitVector) {
        self.pending.push((signal.to_string(), value));
    }

    /// Number of pending writes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Value that will win for `signal`, if any write is pending.
    pub fn pending(&self, signal: &str) -> Option<&BitVector> {
        self.pending
            .iter()
            .rev()
            .find(|(name, _)| name == signal)
            .map(|(_, value)| value)
    }

    /// Applies and clears all pending writes.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by [`Dut::write`]; later writes are dropped.
    pub fn apply(&mut self, dut: &mut dyn Dut) -> Result<usize, HarnessError> {
        let mut seen = HashSet::with_capacity(self.pending.len());
        let count = self.pending.len();
        for (signal, value) in self.pending.drain(..) {
            if !seen.insert(signal.clone()) {
                warn!(dut = dut.name(), signal = %signal, "signal written twice in one cycle");
            }
            dut.write(&signal, value)?;
        }
        Ok(count)
    }
}
