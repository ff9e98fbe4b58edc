//! Stream consumer.
//!
//! Accepts records from an output port of the design. `ready` is high whenever
//! the consumer is willing to take data; after a handshake it drops for
//! `processing_time - 1` edges. Accepted items are buffered until read.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::common::bits::BitVector;
use crate::common::error::HarnessError;
use crate::config::StreamOptions;
use crate::record::{RecordSchema, unpack};
use crate::sim::dut::{Dut, WriteQueue};

use super::channel::{Channel, Direction};
use super::traits::StreamAgent;
use super::transaction::{StreamStats, Transaction};

/// Handshake state of a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    /// `ready` is low for `remaining` more edges.
    Throttle {
        /// Edges left before `ready` rises again.
        remaining: u32,
    },
    /// `ready` is high.
    Ready,
}

/// Samples records from a channel.
#[derive(Debug)]
pub struct Consumer {
    channel: Channel,
    options: StreamOptions,
    state: SampleState,
    ready_high: Option<bool>,
    received: VecDeque<Transaction>,
    stats: StreamStats,
}

impl Consumer {
    /// Binds a consumer to the output port of stream `name`.
    ///
    /// A consumer with `processing_time > 1` starts throttled, so its first
    /// handshake happens no earlier than edge `processing_time - 1`.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::InvalidConfig`] when `options.processing_time` is zero.
    /// * Channel binding errors, see [`Channel::bind`].
    pub fn new(
        dut: &dyn Dut,
        name: &str,
        data_schema: Arc<RecordSchema>,
        metadata_schema: Option<Arc<RecordSchema>>,
        options: StreamOptions,
    ) -> Result<Self, HarnessError> {
        options.validate()?;
        let channel = Channel::bind(
            dut,
            name,
            Direction::Output,
            options.signal_style,
            data_schema,
            metadata_schema,
        )?;
        Ok(Self {
            channel,
            options,
            state: throttle(options.processing_time),
            ready_high: None,
            received: VecDeque::new(),
            stats: StreamStats::default(),
        })
    }

    /// Removes and returns the oldest accepted item, if any.
    pub fn try_consume(&mut self) -> Option<Transaction> {
        self.received.pop_front()
    }

    /// Removes and returns every buffered item in acceptance order.
    pub fn consume_all(&mut self) -> Vec<Transaction> {
        self.received.drain(..).collect()
    }

    /// Number of accepted items not yet read.
    pub fn buffered(&self) -> usize {
        self.received.len()
    }

    /// Current handshake state.
    pub const fn state(&self) -> SampleState {
        self.state
    }

    /// Stream options.
    pub const fn options(&self) -> &StreamOptions {
        &self.options
    }
}

const fn throttle(processing_time: u32) -> SampleState {
    if processing_time > 1 {
        SampleState::Throttle {
            remaining: processing_time - 1,
        }
    } else {
        SampleState::Ready
    }
}

impl StreamAgent for Consumer {
    fn channel(&self) -> &Channel {
        &self.channel
    }

    fn drive(&mut self, writes: &mut WriteQueue) {
        let ready = self.state == SampleState::Ready;
        if self.ready_high != Some(ready) {
            writes.schedule(&self.channel.signals().ready, BitVector::from_bool(ready));
            self.ready_high = Some(ready);
        }
    }

    fn sample(&mut self, dut: &dyn Dut, cycle: u64) -> Result<(), HarnessError> {
        match self.state {
            SampleState::Throttle { remaining } => {
                self.stats.bubble_cycles += 1;
                self.state = if remaining > 1 {
                    SampleState::Throttle {
                        remaining: remaining - 1,
                    }
                } else {
                    SampleState::Ready
                };
            }
            SampleState::Ready => {
                let signals = self.channel.signals();
                if !self.channel.read_flag(dut, &signals.valid)? {
                    self.stats.idle_cycles += 1;
                    return Ok(());
                }

                let data_bits = self.channel.read(dut, &signals.data)?;
                let data = unpack(self.channel.data_schema(), &data_bits)?;
                let metadata = match (&signals.metadata, self.channel.metadata_schema()) {
                    (Some(signal), Some(schema)) => {
                        let bits = self.channel.read(dut, signal)?;
                        Some(unpack(schema, &bits)?)
                    }
                    _ => None,
                };

                debug!(stream = self.channel.name(), cycle, data = %data, "consumed");
                self.stats.record_accept(cycle);
                self.received.push_back(Transaction {
                    data,
                    metadata,
                    cycle,
                });
                self.state = throttle(self.options.processing_time);
            }
        }
        Ok(())
    }

    fn stats(&self) -> &StreamStats {
        &self.stats
    }
}
