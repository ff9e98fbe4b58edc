//! Golden-vector pipeline tester.
//!
//! This module wraps a [`Simulator`] with preloaded input streams and expected
//! output streams. It provides:
//! 1. **Registration:** Schemas are inferred from the first element of each vector.
//! 2. **Execution:** A fixed number of cycles with every agent running.
//! 3. **Checking:** Length, then data, then metadata, in order, naming the stream
//!    and index of the first disagreement.

use std::sync::Arc;

use tracing::{debug, info};

use crate::common::error::HarnessError;
use crate::config::HarnessConfig;
use crate::record::{RecordSchema, RecordValue};
use crate::stream::channel::Direction;
use crate::stream::traits::StreamAgent;
use crate::stream::transaction::Transaction;

use super::dut::Dut;
use super::report::{StreamReport, TestReport};
use super::simulator::{ConsumerId, ProducerId, Simulator};

/// Golden data of one output stream.
#[derive(Debug)]
struct ExpectedStream {
    id: ConsumerId,
    data: Vec<RecordValue>,
    metadata: Option<Vec<RecordValue>>,
    received: Vec<Transaction>,
}

/// Drives preloaded inputs through a design and checks its outputs.
#[derive(Debug)]
pub struct PipelineTester {
    sim: Simulator,
    config: HarnessConfig,
    expected: Vec<ExpectedStream>,
}

impl PipelineTester {
    /// Tester over `dut` with default settings.
    pub fn new(dut: impl Dut + 'static) -> Self {
        Self::with_config(dut, HarnessConfig::default())
    }

    /// Tester over `dut` with explicit settings.
    pub fn with_config(dut: impl Dut + 'static, config: HarnessConfig) -> Self {
        Self {
            sim: Simulator::new(dut),
            config,
            expected: Vec::new(),
        }
    }

    /// Registers an input stream and preloads its queue.
    ///
    /// `metadata`, when given, is paired with `data` by index. The stream's schema
    /// is taken from the first item, so an input needs at least one.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::InvalidConfig`] when `data` is empty or the metadata length differs.
    /// * Producer construction and encoding errors.
    pub fn add_input_stream(
        &mut self,
        name: &str,
        data: Vec<RecordValue>,
        metadata: Option<Vec<RecordValue>>,
        processing_time: u32,
    ) -> Result<ProducerId, HarnessError> {
        let Some(first) = data.first() else {
            return Err(HarnessError::InvalidConfig(format!(
                "input stream `{name}` has no data to infer its schema from"
            )));
        };
        let data_schema = Arc::clone(first.schema());
        let metadata_schema = infer_metadata(name, data.len(), metadata.as_deref())?;

        let options = self.config.stream_options(processing_time);
        let id = self
            .sim
            .add_producer(name, data_schema, metadata_schema, options)?;

        let metadata = metadata.map_or_else(|| vec![None; data.len()], |m| {
            m.into_iter().map(Some).collect()
        });
        for (item, meta) in data.into_iter().zip(metadata) {
            self.sim.produce(id, item, meta)?;
        }
        Ok(id)
    }

    /// Registers an output stream with its golden vectors.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::EmptyExpectedStream`] when `expected_data` is empty.
    /// * [`HarnessError::InvalidConfig`] when the metadata length differs.
    /// * Consumer construction errors.
    pub fn add_output_stream(
        &mut self,
        name: &str,
        expected_data: Vec<RecordValue>,
        expected_metadata: Option<Vec<RecordValue>>,
        processing_time: u32,
    ) -> Result<ConsumerId, HarnessError> {
        let Some(first) = expected_data.first() else {
            return Err(HarnessError::EmptyExpectedStream {
                stream: name.to_string(),
            });
        };
        let data_schema = Arc::clone(first.schema());
        let metadata_schema =
            infer_metadata(name, expected_data.len(), expected_metadata.as_deref())?;

        let options = self.config.stream_options(processing_time);
        let id = self
            .sim
            .add_consumer(name, data_schema, metadata_schema, options)?;
        self.expected.push(ExpectedStream {
            id,
            data: expected_data,
            metadata: expected_metadata,
            received: Vec::new(),
        });
        Ok(id)
    }

    /// Runs `cycles` more ticks, then checks every output stream against its golden vectors.
    ///
    /// Transactions accumulate across calls, so a short run that failed with
    /// [`HarnessError::LengthMismatch`] can be continued.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::LengthMismatch`], [`HarnessError::DataMismatch`] or
    ///   [`HarnessError::MetadataMismatch`] for the first failing output stream.
    /// * Any error raised while simulating.
    pub fn run_test(&mut self, cycles: u64) -> Result<TestReport, HarnessError> {
        info!(
            cycles,
            inputs = self.sim.producers().len(),
            outputs = self.expected.len(),
            "starting test"
        );
        self.sim.run(cycles)?;

        let mut streams: Vec<StreamReport> = self
            .sim
            .producers()
            .iter()
            .map(|p| StreamReport {
                name: p.name().to_string(),
                direction: Direction::Input,
                stats: p.stats().clone(),
                transactions: p.sent().to_vec(),
            })
            .collect();

        for expected in &mut self.expected {
            let drained = self.sim.consume_all(expected.id)?;
            expected.received.extend(drained);
            let consumer = self.sim.consumer(expected.id)?;
            check_stream(consumer.name(), expected)?;
            debug!(stream = consumer.name(), items = expected.received.len(), "stream matched");
            streams.push(StreamReport {
                name: consumer.name().to_string(),
                direction: Direction::Output,
                stats: consumer.stats().clone(),
                transactions: expected.received.clone(),
            });
        }

        info!(cycles = self.sim.cycle(), "test passed");
        Ok(TestReport {
            cycles: self.sim.cycle(),
            streams,
        })
    }

    /// Returns the oldest transaction of an output stream, ticking until one
    /// arrives or `max_wait_cycles` pass. The item still counts toward the
    /// stream's golden check.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Timeout`] when nothing arrives in time, or
    /// [`HarnessError::UnknownHandle`] for a foreign handle.
    pub fn consume(&mut self, id: ConsumerId) -> Result<Transaction, HarnessError> {
        let txn = self.sim.consume(id, self.config.max_wait_cycles)?;
        if let Some(expected) = self.expected.iter_mut().find(|e| e.id == id) {
            expected.received.push(txn.clone());
        }
        Ok(txn)
    }

    /// The underlying simulator.
    pub const fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// Mutable access to the underlying simulator.
    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    /// Shared settings.
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }
}

/// Metadata schema from the first metadata element, checking the length matches.
fn infer_metadata(
    name: &str,
    len: usize,
    metadata: Option<&[RecordValue]>,
) -> Result<Option<Arc<RecordSchema>>, HarnessError> {
    let Some(metadata) = metadata else {
        return Ok(None);
    };
    if metadata.len() != len {
        return Err(HarnessError::InvalidConfig(format!(
            "stream `{name}` has {len} data items but {} metadata items",
            metadata.len()
        )));
    }
    Ok(metadata.first().map(|m| Arc::clone(m.schema())))
}

fn check_stream(
    name: &str,
    expected: &ExpectedStream,
) -> Result<(), HarnessError> {
    let actual = expected.received.as_slice();
    if actual.len() != expected.data.len() {
        return Err(HarnessError::LengthMismatch {
            stream: name.to_string(),
            expected: expected.data.len(),
            actual: actual.len(),
        });
    }

    for (index, (want, got)) in expected.data.iter().zip(actual).enumerate() {
        if *want != got.data {
            return Err(HarnessError::DataMismatch {
                stream: name.to_string(),
                index,
                expected: want.to_string(),
                actual: got.data.to_string(),
            });
        }
    }

    let Some(metadata) = &expected.metadata else {
        return Ok(());
    };
    for (index, (want, got)) in metadata.iter().zip(actual).enumerate() {
        if got.metadata.as_ref() != Some(want) {
            return Err(HarnessError::MetadataMismatch {
                stream: name.to_string(),
                index,
                expected: want.to_string(),
                actual: got
                    .metadata
                    .as_ref()
                    .map_or_else(|| "none".to_string(), ToString::to_string),
            });
        }
    }
    Ok(())
}
