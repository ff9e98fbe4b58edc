use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cyclebench_core::common::{BitVector, HarnessError};
use cyclebench_core::models::SignalTable;
use cyclebench_core::sim::Dut;

/// What the sink saw at one active edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSample {
    pub edge: u64,
    pub valid: bool,
    pub ready: bool,
    pub data: BitVector,
}

/// Shared view of everything a [`ScriptedSink`] observed.
#[derive(Debug, Clone, Default)]
pub struct SinkLog {
    inner: Arc<Mutex<Vec<EdgeSample>>>,
}

impl SinkLog {
    pub fn samples(&self) -> Vec<EdgeSample> {
        self.inner.lock().unwrap().clone()
    }

    /// Edges at which a handshake completed, with the data taken.
    pub fn accepted(&self) -> Vec<(u64, BitVector)> {
        self.samples()
            .into_iter()
            .filter(|s| s.valid && s.ready)
            .map(|s| (s.edge, s.data))
            .collect()
    }
}

/// Input port `X_in_*` only; `ready` follows a per-edge script, then stays high.
#[derive(Debug)]
pub struct ScriptedSink {
    table: SignalTable,
    stream: String,
    script: VecDeque<bool>,
    edge: u64,
    log: SinkLog,
}

impl ScriptedSink {
    pub fn new(stream: &str, data_width: usize, script: Vec<bool>) -> (Self, SinkLog) {
        let mut table = SignalTable::new();
        table.declare(format!("{stream}_in_valid"), 1);
        table.declare(format!("{stream}_in_ready"), 1);
        table.declare(format!("{stream}_in_data"), data_width);
        let log = SinkLog::default();
        let mut sink = Self {
            table,
            stream: stream.to_string(),
            script: script.into(),
            edge: 0,
            log: log.clone(),
        };
        sink.settle();
        (sink, log)
    }

    /// Holds `ready` low for the first `edges` edges.
    pub fn stalled(stream: &str, data_width: usize, edges: usize) -> (Self, SinkLog) {
        Self::new(stream, data_width, vec![false; edges])
    }

    fn signal(&self, suffix: &str) -> String {
        format!("{}_in_{suffix}", self.stream)
    }
}

impl Dut for ScriptedSink {
    fn name(&self) -> &str {
        "scripted_sink"
    }

    fn signal_width(&self, signal: &str) -> Option<usize> {
        self.table.width(signal)
    }

    fn read(&self, signal: &str) -> Option<BitVector> {
        self.table.read(signal)
    }

    fn write(&mut self, signal: &str, value: BitVector) -> Result<(), HarnessError> {
        self.table.write("scripted_sink", signal, value)
    }

    fn clock_edge(&mut self) {
        let sample = EdgeSample {
            edge: self.edge,
            valid: self.table.flag(&self.signal("valid")),
            ready: self.table.flag(&self.signal("ready")),
            data: self.table.read(&self.signal("data")).unwrap(),
        };
        self.log.inner.lock().unwrap().push(sample);
        let _ = self.script.pop_front();
        self.edge += 1;
    }

    fn settle(&mut self) {
        let ready = self.script.front().copied().unwrap_or(true);
        let name = self.signal("ready");
        self.table.set_flag(&name, ready);
    }
}
