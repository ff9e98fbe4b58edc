//! Valid/ready FIFO stage.
//!
//! A reference design that forwards items from the input port of a stream to its
//! output port through a bounded queue:
//!
//! * `in_ready` is high while the queue has room.
//! * `out_valid` is high while the queue holds an item; `out_data`/`out_metadata`
//!   show the oldest item.
//! * At each edge the head is popped if `out_valid && out_ready`, then a new item
//!   is pushed if `in_valid && in_ready`, both judged on pre-edge values.
//!
//! An optional transform maps each data word on the way in, which lets tests
//! model a datapath or inject corruption.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::common::bits::BitVector;
use crate::common::error::HarnessError;
use crate::sim::dut::Dut;
use crate::stream::channel::{ChannelSignals, Direction, SignalStyle};

use super::signals::SignalTable;

/// Data transform applied to each item as it enters the queue.
pub type Transform = Box<dyn Fn(&BitVector) -> BitVector>;

#[derive(Debug, Clone)]
struct Entry {
    data: BitVector,
    metadata: Option<BitVector>,
}

/// A single pipeline stage with full backpressure.
pub struct FifoStage {
    name: String,
    stream: String,
    data_width: usize,
    metadata_width: Option<usize>,
    depth: usize,
    style: SignalStyle,
    input: ChannelSignals,
    output: ChannelSignals,
    table: SignalTable,
    queue: VecDeque<Entry>,
    transform: Option<Transform>,
    edges: u64,
}

impl FifoStage {
    /// Builds a stage on `stream` with `depth` entries.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidConfig`] when `depth` or `data_width` is zero.
    pub fn new(
        stream: &str,
        data_width: usize,
        metadata_width: Option<usize>,
        depth: usize,
    ) -> Result<Self, HarnessError> {
        if depth == 0 {
            return Err(HarnessError::InvalidConfig(format!(
                "fifo stage `{stream}` needs a depth of at least 1"
            )));
        }
        if data_width == 0 {
            return Err(HarnessError::InvalidConfig(format!(
                "fifo stage `{stream}` needs a non-empty data word"
            )));
        }
        let mut stage = Self {
            name: format!("{stream}_fifo"),
            stream: stream.to_string(),
            data_width,
            metadata_width,
            depth,
            style: SignalStyle::default(),
            input: ChannelSignals::resolve(stream, SignalStyle::default(), Direction::Input, false),
            output: ChannelSignals::resolve(stream, SignalStyle::default(), Direction::Output, false),
            table: SignalTable::new(),
            queue: VecDeque::with_capacity(depth),
            transform: None,
            edges: 0,
        };
        stage.declare();
        Ok(stage)
    }

    /// Renames the ports to `style`. Resets all signals.
    #[must_use]
    pub fn with_style(mut self, style: SignalStyle) -> Self {
        self.style = style;
        self.declare();
        self
    }

    /// Applies `transform` to every data word as it enters the queue. The result
    /// is truncated or zero-extended to the data width.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&BitVector) -> BitVector + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Items currently held.
    pub fn occupancy(&self) -> usize {
        self.queue.len()
    }

    /// Capacity.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Edges seen so far.
    pub const fn edges(&self) -> u64 {
        self.edges
    }

    /// Port naming in use.
    pub const fn style(&self) -> SignalStyle {
        self.style
    }

    /// Stream the stage sits on.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    fn declare(&mut self) {
        let meta = self.metadata_width.is_some();
        self.input = ChannelSignals::resolve(&self.stream, self.style, Direction::Input, meta);
        self.output = ChannelSignals::resolve(&self.stream, self.style, Direction::Output, meta);
        self.table = SignalTable::new();
        for port in [&self.input, &self.output] {
            self.table.declare(port.valid.as_str(), 1);
            self.table.declare(port.ready.as_str(), 1);
            self.table.declare(port.data.as_str(), self.data_width);
            if let (Some(signal), Some(width)) = (&port.metadata, self.metadata_width) {
                self.table.declare(signal.as_str(), width);
            }
        }
        self.queue.clear();
        self.settle_outputs();
    }

    fn settle_outputs(&mut self) {
        let has_room = self.queue.len() < self.depth;
        self.table.set_flag(&self.input.ready, has_room);
        self.table.set_flag(&self.output.valid, !self.queue.is_empty());

        let head = self.queue.front().cloned();
        let data = head
            .as_ref()
            .map_or_else(|| BitVector::zeros(self.data_width), |e| e.data.clone());
        self.table.set(&self.output.data, &data);
        if let (Some(signal), Some(width)) = (&self.output.metadata, self.metadata_width) {
            let meta = head
                .and_then(|e| e.metadata)
                .unwrap_or_else(|| BitVector::zeros(width));
            self.table.set(signal, &meta);
        }
    }
}

impl fmt::Debug for FifoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoStage")
            .field("name", &self.name)
            .field("depth", &self.depth)
            .field("occupancy", &self.queue.len())
            .field("style", &self.style)
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

impl Dut for FifoStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal_width(&self, signal: &str) -> Option<usize> {
        self.table.width(signal)
    }

    fn read(&self, signal: &str) -> Option<BitVector> {
        self.table.read(signal)
    }

    fn write(&mut self, signal: &str, value: BitVector) -> Result<(), HarnessError> {
        self.table.write(&self.name, signal, value)
    }

    fn clock_edge(&mut self) {
        let pop = self.table.flag(&self.output.valid) && self.table.flag(&self.output.ready);
        let push = self.table.flag(&self.input.valid) && self.table.flag(&self.input.ready);

        if pop {
            let _ = self.queue.pop_front();
        }
        if push {
            let raw = self
                .table
                .read(&self.input.data)
                .unwrap_or_else(|| BitVector::zeros(self.data_width));
            let data = match &self.transform {
                Some(transform) => transform(&raw).slice(0, self.data_width),
                None => raw,
            };
            let metadata = self
                .input
                .metadata
                .as_deref()
                .and_then(|signal| self.table.read(signal));
            self.queue.push_back(Entry { data, metadata });
        }
        trace!(
            dut = %self.name,
            edge = self.edges,
            push,
            pop,
            occupancy = self.queue.len(),
            "fifo edge"
        );
        self.edges += 1;
    }

    fn settle(&mut self) {
        self.settle_outputs();
    }
}
