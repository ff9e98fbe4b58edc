//! Named signal storage.
//!
//! Backs the read/write half of [`Dut`](crate::sim::dut::Dut) for reference models:
//! every signal is declared once with a fixed width and starts at zero.

use std::collections::BTreeMap;

use crate::common::bits::BitVector;
use crate::common::error::HarnessError;

/// Width-checked signal values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalTable {
    signals: BTreeMap<String, BitVector>,
}

impl SignalTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as a `width`-bit signal initialised to zero.
    /// Re-declaring a signal resets it.
    pub fn declare(&mut self, name: impl Into<String>, width: usize) {
        let _ = self.signals.insert(name.into(), BitVector::zeros(width));
    }

    /// Width of `name`.
    pub fn width(&self, name: &str) -> Option<usize> {
        self.signals.get(name).map(BitVector::width)
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<&BitVector> {
        self.signals.get(name)
    }

    /// Owned copy of the current value of `name`.
    pub fn read(&self, name: &str) -> Option<BitVector> {
        self.get(name).cloned()
    }

    /// Single-bit view of `name`; unknown signals read as low.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(BitVector::as_bool)
    }

    /// Writes `value` to `name`, checking the width.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::MissingSignal`] when `name` is not declared.
    /// * [`HarnessError::SignalWidthMismatch`] when the widths differ.
    pub fn write(&mut self, dut: &str, name: &str, value: BitVector) -> Result<(), HarnessError> {
        let slot = self
            .signals
            .get_mut(name)
            .ok_or_else(|| HarnessError::MissingSignal {
                dut: dut.to_string(),
                signal: name.to_string(),
            })?;
        if slot.width() != value.width() {
            return Err(HarnessError::SignalWidthMismatch {
                signal: name.to_string(),
                expected: slot.width(),
                found: value.width(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Internal update used by models for their own outputs. Resizes to the
    /// declared width; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: &BitVector) {
        if let Some(slot) = self.signals.get_mut(name) {
            *slot = value.slice(0, slot.width());
        }
    }

    /// Sets a single-bit signal.
    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.set(name, &BitVector::from_bool(value));
    }

    /// Declared signal names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }
}
