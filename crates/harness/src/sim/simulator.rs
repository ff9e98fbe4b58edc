//! Simulator: owns the design and every stream agent side-by-side.
//!
//! Agents never hold a reference to the design. The simulator lends it to them
//! once per phase, which keeps a single writer per signal set without interior
//! mutability.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::common::error::HarnessError;
use crate::config::StreamOptions;
use crate::record::{RecordSchema, RecordValue};
use crate::stream::consumer::Consumer;
use crate::stream::producer::Producer;
use crate::stream::traits::StreamAgent;
use crate::stream::transaction::Transaction;

use super::dut::{Dut, WriteQueue};

/// Handle to a producer registered with a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProducerId(usize);

/// Handle to a consumer registered with a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(usize);

/// Top-level simulator: design under test plus stream agents.
#[derive(Debug)]
pub struct Simulator {
    dut: Box<dyn Dut>,
    producers: Vec<Producer>,
    consumers: Vec<Consumer>,
    writes: WriteQueue,
    cycle: u64,
}

impl Simulator {
    /// Wraps `dut`. Clock and reset are assumed settled.
    pub fn new(dut: impl Dut + 'static) -> Self {
        Self {
            dut: Box::new(dut),
            producers: Vec::new(),
            consumers: Vec::new(),
            writes: WriteQueue::new(),
            cycle: 0,
        }
    }

    /// Attaches a producer to the input port of stream `name`.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::DuplicateStream`] if a producer already drives `name`.
    /// * Construction errors, see [`Producer::new`].
    pub fn add_producer(
        &mut self,
        name: &str,
        data_schema: Arc<RecordSchema>,
        metadata_schema: Option<Arc<RecordSchema>>,
        options: StreamOptions,
    ) -> Result<ProducerId, HarnessError> {
        if self.producers.iter().any(|p| p.name() == name) {
            return Err(HarnessError::DuplicateStream {
                stream: name.to_string(),
            });
        }
        let producer = Producer::new(&*self.dut, name, data_schema, metadata_schema, options)?;
        debug!(stream = name, processing_time = options.processing_time, "producer attached");
        self.producers.push(producer);
        Ok(ProducerId(self.producers.len() - 1))
    }

    /// Attaches a consumer to the output port of stream `name`.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::DuplicateStream`] if a consumer already samples `name`.
    /// * Construction errors, see [`Consumer::new`].
    pub fn add_consumer(
        &mut self,
        name: &str,
        data_schema: Arc<RecordSchema>,
        metadata_schema: Option<Arc<RecordSchema>>,
        options: StreamOptions,
    ) -> Result<ConsumerId, HarnessError> {
        if self.consumers.iter().any(|c| c.name() == name) {
            return Err(HarnessError::DuplicateStream {
                stream: name.to_string(),
            });
        }
        let consumer = Consumer::new(&*self.dut, name, data_schema, metadata_schema, options)?;
        debug!(stream = name, processing_time = options.processing_time, "consumer attached");
        self.consumers.push(consumer);
        Ok(ConsumerId(self.consumers.len() - 1))
    }

    /// Queues an item on a producer. Never advances the clock.
    ///
    /// # Errors
    ///
    /// [`HarnessError::UnknownHandle`] for a foreign handle, otherwise see
    /// [`Producer::produce`].
    pub fn produce(
        &mut self,
        id: ProducerId,
        data: RecordValue,
        metadata: Option<RecordValue>,
    ) -> Result<(), HarnessError> {
        self.producer_mut(id)?.produce(data, metadata)
    }

    /// Advances the simulation by one clock cycle.
    ///
    /// Drive phase: agents schedule writes, the writes land together and the
    /// design settles. Edge phase: agents sample the pre-edge values, then the
    /// design clocks and settles again.
    ///
    /// # Errors
    ///
    /// Propagates the first agent or write error. The cycle counter does not
    /// advance on error.
    pub fn tick(&mut self) -> Result<(), HarnessError> {
        for producer in &mut self.producers {
            producer.drive(&mut self.writes);
        }
        for consumer in &mut self.consumers {
            consumer.drive(&mut self.writes);
        }
        let applied = self.writes.apply(&mut *self.dut)?;
        self.dut.settle();

        trace!(cycle = self.cycle, writes = applied, "edge");
        for producer in &mut self.producers {
            producer.sample(&*self.dut, self.cycle)?;
        }
        for consumer in &mut self.consumers {
            consumer.sample(&*self.dut, self.cycle)?;
        }
        self.dut.clock_edge();
        self.dut.settle();
        self.cycle += 1;
        Ok(())
    }

    /// Runs exactly `cycles` ticks.
    ///
    /// # Errors
    ///
    /// See [`Simulator::tick`].
    pub fn run(&mut self, cycles: u64) -> Result<(), HarnessError> {
        for _ in 0..cycles {
            self.tick()?;
        }
        Ok(())
    }

    /// Ticks until `done` holds, checking before every tick. Returns the number of
    /// ticks taken.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Timeout`] with a partial report when `max_cycles` ticks pass
    /// without `done` holding.
    pub fn run_until<F>(&mut self, mut done: F, max_cycles: u64) -> Result<u64, HarnessError>
    where
        F: FnMut(&Self) -> bool,
    {
        for waited in 0..max_cycles {
            if done(self) {
                return Ok(waited);
            }
            self.tick()?;
        }
        if done(self) {
            return Ok(max_cycles);
        }
        Err(self.timeout(max_cycles))
    }

    /// Returns the oldest buffered item of a consumer, ticking the clock until one
    /// arrives.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::UnknownHandle`] for a foreign handle.
    /// * [`HarnessError::Timeout`] when nothing arrives within `max_cycles` ticks.
    pub fn consume(
        &mut self,
        id: ConsumerId,
        max_cycles: u64,
    ) -> Result<Transaction, HarnessError> {
        let mut waited = 0;
        loop {
            if let Some(txn) = self.consumer_mut(id)?.try_consume() {
                return Ok(txn);
            }
            if waited == max_cycles {
                return Err(self.timeout(max_cycles));
            }
            self.tick()?;
            waited += 1;
        }
    }

    /// Drains every buffered item of a consumer without ticking.
    ///
    /// # Errors
    ///
    /// [`HarnessError::UnknownHandle`] for a foreign handle.
    pub fn consume_all(&mut self, id: ConsumerId) -> Result<Vec<Transaction>, HarnessError> {
        Ok(self.consumer_mut(id)?.consume_all())
    }

    /// Items buffered on each consumer, by stream name.
    pub fn pending(&self) -> Vec<(String, usize)> {
        self.consumers
            .iter()
            .map(|c| (c.name().to_string(), c.buffered()))
            .collect()
    }

    /// True when every producer has handed off all of its items.
    pub fn producers_drained(&self) -> bool {
        self.producers.iter().all(Producer::is_drained)
    }

    /// Edges simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The design under test.
    pub fn dut(&self) -> &dyn Dut {
        &*self.dut
    }

    /// Mutable access to the design, e.g. for fault injection between ticks.
    pub fn dut_mut(&mut self) -> &mut dyn Dut {
        &mut *self.dut
    }

    /// Producer by handle.
    ///
    /// # Errors
    ///
    /// [`HarnessError::UnknownHandle`] for a foreign handle.
    pub fn producer(&self, id: ProducerId) -> Result<&Producer, HarnessError> {
        self.producers.get(id.0).ok_or(HarnessError::UnknownHandle {
            kind: "producer",
            index: id.0,
        })
    }

    /// Consumer by handle.
    ///
    /// # Errors
    ///
    /// [`HarnessError::UnknownHandle`] for a foreign handle.
    pub fn consumer(&self, id: ConsumerId) -> Result<&Consumer, HarnessError> {
        self.consumers.get(id.0).ok_or(HarnessError::UnknownHandle {
            kind: "consumer",
            index: id.0,
        })
    }

    /// All producers in registration order.
    pub fn producers(&self) -> &[Producer] {
        &self.producers
    }

    /// All consumers in registration order.
    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    fn producer_mut(&mut self, id: ProducerId) -> Result<&mut Producer, HarnessError> {
        self.producers
            .get_mut(id.0)
            .ok_or(HarnessError::UnknownHandle {
                kind: "producer",
                index: id.0,
            })
    }

    pub(crate) fn consumer_mut(&mut self, id: ConsumerId) -> Result<&mut Consumer, HarnessError> {
        self.consumers
            .get_mut(id.0)
            .ok_or(HarnessError::UnknownHandle {
                kind: "consumer",
                index: id.0,
            })
    }

    fn timeout(&self, cycles: u64) -> HarnessError {
        HarnessError::Timeout {
            cycles,
            pending: self.pending(),
        }
    }
}
