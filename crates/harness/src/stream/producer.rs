//! Stream producer.
//!
//! Drives a queue of records into the design over a valid/ready channel:
//! 1. **Offer:** Pop the next item, drive data/metadata and raise `valid`.
//! 2. **Backpressure:** Hold the offer unchanged across edges until `ready` is seen.
//! 3. **Shaping:** After a handshake, keep `valid` low for `processing_time - 1` edges.
//! 4. **Drain:** With nothing queued after a handshake, drop `valid` for one more edge.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::common::bits::BitVector;
use crate::common::error::HarnessError;
use crate::config::StreamOptions;
use crate::record::{RecordSchema, RecordValue, pack};
use crate::sim::dut::{Dut, WriteQueue};

use super::channel::{Channel, Direction};
use super::traits::StreamAgent;
use super::transaction::{StreamStats, Transaction};

/// A queued item with its encoded signals.
#[derive(Debug, Clone)]
struct PendingItem {
    data: RecordValue,
    metadata: Option<RecordValue>,
    data_bits: BitVector,
    metadata_bits: Option<BitVector>,
}

/// Handshake state of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    /// Nothing offered; the next drive phase pops the queue.
    Idle,
    /// `valid` is high and the offered item is held.
    Offered,
    /// Throughput-shaping bubble; `valid` is low for `remaining` more edges.
    Bubble {
        /// Edges left in the bubble.
        remaining: u32,
    },
    /// Queue ran dry after a handshake; `valid` is low for one edge.
    Drain,
}

/// Drives records onto a channel.
#[derive(Debug)]
pub struct Producer {
    channel: Channel,
    options: StreamOptions,
    queue: VecDeque<PendingItem>,
    offered: Option<PendingItem>,
    state: DriveState,
    valid_high: bool,
    sent: Vec<Transaction>,
    stats: StreamStats,
}

impl Producer {
    /// Binds a producer to the input port of stream `name`.
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
            Direction::Input,
            options.signal_style,
            data_schema,
            metadata_schema,
        )?;
        Ok(Self {
            channel,
            options,
            queue: VecDeque::new(),
            offered: None,
            state: DriveState::Idle,
            valid_high: false,
            sent: Vec::new(),
            stats: StreamStats::default(),
        })
    }

    /// Queues `data` (and `metadata`) for transmission.
    ///
    /// Encoding happens here, so schema defects surface at the call site.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::MissingMetadata`] / [`HarnessError::UnexpectedMetadata`] when the
    ///   presence of `metadata` disagrees with the channel.
    /// * [`HarnessError::Codec`] when a value cannot be packed.
    pub fn produce(
        &mut self,
        data: RecordValue,
        metadata: Option<RecordValue>,
    ) -> Result<(), HarnessError> {
        let data_bits = pack(self.channel.data_schema(), &data)?;
        let metadata_bits = match (self.channel.metadata_schema(), &metadata) {
            (Some(schema), Some(meta)) => Some(pack(schema, meta)?),
            (None, None) => None,
            (Some(_), None) => {
                return Err(HarnessError::MissingMetadata {
                    stream: self.channel.name().to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(HarnessError::UnexpectedMetadata {
                    stream: self.channel.name().to_string(),
                });
            }
        };
        self.queue.push_back(PendingItem {
            data,
            metadata,
            data_bits,
            metadata_bits,
        });
        Ok(())
    }

    /// Items waiting to be offered (excluding the one on the wire).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued or on the wire.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.offered.is_none()
    }

    /// Current handshake state.
    pub const fn state(&self) -> DriveState {
        self.state
    }

    /// Every item accepted so far, in acceptance order.
    pub fn sent(&self) -> &[Transaction] {
        &self.sent
    }

    /// Stream options.
    pub const fn options(&self) -> &StreamOptions {
        &self.options
    }

    fn lower_valid(&mut self, writes: &mut WriteQueue) {
        if self.valid_high {
            writes.schedule(&self.channel.signals().valid, BitVector::from_bool(false));
            self.valid_high = false;
        }
    }

    fn check_stable(
        &self,
        dut: &dyn Dut,
        item: &PendingItem,
        cycle: u64,
    ) -> Result<(), HarnessError> {
        let signals = self.channel.signals();
        let unstable = |signal: &str| HarnessError::UnstableOffer {
            stream: self.channel.name().to_string(),
            signal: signal.to_string(),
            cycle,
        };

        if !self.channel.read_flag(dut, &signals.valid)? {
            return Err(unstable(&signals.valid));
        }
        if self.channel.read(dut, &signals.data)? != item.data_bits {
            return Err(unstable(&signals.data));
        }
        if let (Some(signal), Some(bits)) = (&signals.metadata, &item.metadata_bits) {
            if &self.channel.read(dut, signal)? != bits {
                return Err(unstable(signal));
            }
        }
        Ok(())
    }

    /// State after a handshake or a finished bubble.
    fn next_after_handshake(&self) -> DriveState {
        if self.queue.is_empty() {
            DriveState::Drain
        } else {
            DriveState::Idle
        }
    }
}

impl StreamAgent for Producer {
    fn channel(&self) -> &Channel {
        &self.channel
    }

    fn drive(&mut self, writes: &mut WriteQueue) {
        match self.state {
            DriveState::Idle => {
                let Some(item) = self.queue.pop_front() else {
                    self.lower_valid(writes);
                    return;
                };
                let signals = self.channel.signals();
                writes.schedule(&signals.data, item.data_bits.clone());
                if let (Some(signal), Some(bits)) = (&signals.metadata, &item.metadata_bits) {
                    writes.schedule(signal, bits.clone());
                }
                writes.schedule(&signals.valid, BitVector::from_bool(true));
                self.valid_high = true;
                self.offered = Some(item);
                self.state = DriveState::Offered;
            }
            DriveState::Offered => {}
            DriveState::Bubble { .. } | DriveState::Drain => self.lower_valid(writes),
        }
    }

    fn sample(&mut self, dut: &dyn Dut, cycle: u64) -> Result<(), HarnessError> {
        match self.state {
            DriveState::Offered => {
                let Some(item) = self.offered.take() else {
                    self.state = DriveState::Idle;
                    return Ok(());
                };
                if self.options.check_stability {
                    self.check_stable(dut, &item, cycle)?;
                }
                let ready = self.channel.read_flag(dut, &self.channel.signals().ready)?;
                if !ready {
                    trace!(stream = self.channel.name(), cycle, "offer stalled");
                    self.stats.stall_cycles += 1;
                    self.offered = Some(item);
                    return Ok(());
                }

                debug!(stream = self.channel.name(), cycle, data = %item.data, "produced");
                self.stats.record_accept(cycle);
                self.sent.push(Transaction {
                    data: item.data,
                    metadata: item.metadata,
                    cycle,
                });
                self.state = if self.options.processing_time > 1 {
                    DriveState::Bubble {
                        remaining: self.options.processing_time - 1,
                    }
                } else {
                    self.next_after_handshake()
                };
            }
            DriveState::Bubble { remaining } => {
                self.stats.bubble_cycles += 1;
                self.state = if remaining > 1 {
                    DriveState::Bubble {
                        remaining: remaining - 1,
                    }
                } else {
                    self.next_after_handshake()
                };
            }
            DriveState::Drain => {
                self.stats.idle_cycles += 1;
                self.state = DriveState::Idle;
            }
            DriveState::Idle => self.stats.idle_cycles += 1,
        }
        Ok(())
    }

    fn stats(&self) -> &StreamStats {
        &self.stats
    }
}
