//! Configuration system for the harness.
//!
//! This module defines all configuration structures used to parameterize streams
//! and scenario runs. It provides:
//! 1. **Defaults:** Baseline cadence, naming style and wait bounds.
//! 2. **Harness:** Settings shared by every stream of a tester.
//! 3. **Scenarios:** JSON-described schemas, reference DUT and stream vectors.
//!
//! Configuration is supplied via JSON scenario files (see the `cyclebench` CLI) or
//! built in code starting from `HarnessConfig::default()`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::common::error::{ConfigError, HarnessError};
use crate::models::fifo::FifoStage;
use crate::record::{RecordSchema, RecordValue};
use crate::sim::tester::PipelineTester;
use crate::stream::channel::SignalStyle;

/// Default configuration constants for the harness.
mod defaults {
    /// Cycles between consecutive handshakes of one agent (1 = back-to-back).
    pub const PROCESSING_TIME: u32 = 1;

    /// Offered data is read back and checked for stability at every edge.
    pub const CHECK_STABILITY: bool = true;

    /// Upper bound for blocking waits such as `PipelineTester::consume`.
    pub const MAX_WAIT_CYCLES: u64 = 10_000;

    /// Cycles a scenario runs when the file does not say.
    pub const SCENARIO_CYCLES: u64 = 1_000;

    /// Entries of the reference FIFO stage.
    pub const FIFO_DEPTH: usize = 2;
}

/// Per-stream options handed to producers and consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StreamOptions {
    /// Minimum cycles between handshakes; must be at least 1.
    #[serde(default = "StreamOptions::default_processing_time")]
    pub processing_time: u32,

    /// Port naming convention.
    #[serde(default)]
    pub signal_style: SignalStyle,

    /// Fail with `UnstableOffer` if offered signals change before acceptance.
    #[serde(default = "StreamOptions::default_check_stability")]
    pub check_stability: bool,
}

impl StreamOptions {
    const fn default_processing_time() -> u32 {
        defaults::PROCESSING_TIME
    }

    const fn default_check_stability() -> bool {
        defaults::CHECK_STABILITY
    }

    /// Same options with a different cadence.
    #[must_use]
    pub const fn with_processing_time(mut self, processing_time: u32) -> Self {
        self.processing_time = processing_time;
        self
    }

    /// Checks the cadence.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidConfig`] when `processing_time` is zero.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.processing_time == 0 {
            return Err(HarnessError::InvalidConfig(
                "processing_time must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            processing_time: defaults::PROCESSING_TIME,
            signal_style: SignalStyle::default(),
            check_stability: defaults::CHECK_STABILITY,
        }
    }
}

/// Settings shared by all streams of a tester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HarnessConfig {
    /// Port naming convention.
    #[serde(default)]
    pub signal_style: SignalStyle,

    /// Read back offered signals at every edge.
    #[serde(default = "HarnessConfig::default_check_stability")]
    pub check_stability: bool,

    /// Bound for `PipelineTester::consume`.
    #[serde(default = "HarnessConfig::default_max_wait_cycles")]
    pub max_wait_cycles: u64,
}

impl HarnessConfig {
    const fn default_check_stability() -> bool {
        defaults::CHECK_STABILITY
    }

    const fn default_max_wait_cycles() -> u64 {
        defaults::MAX_WAIT_CYCLES
    }

    /// Stream options with this config's style and stability check.
    pub const fn stream_options(&self, processing_time: u32) -> StreamOptions {
        StreamOptions {
            processing_time,
            signal_style: self.signal_style,
            check_stability: self.check_stability,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            signal_style: SignalStyle::default(),
            check_stability: defaults::CHECK_STABILITY,
            max_wait_cycles: defaults::MAX_WAIT_CYCLES,
        }
    }
}

/// Reference design a scenario runs against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DutConfig {
    /// Stream the design sits on; its input stream defines the data layout.
    pub stream: String,

    /// FIFO depth.
    #[serde(default = "DutConfig::default_depth")]
    pub depth: usize,
}

impl DutConfig {
    const fn default_depth() -> usize {
        defaults::FIFO_DEPTH
    }
}

/// One stream of a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Stream name.
    pub name: String,

    /// Name of the data schema in `ScenarioConfig::schemas`.
    pub data_schema: String,

    /// Name of the metadata schema, when the stream carries metadata.
    #[serde(default)]
    pub metadata_schema: Option<String>,

    /// Cycles between handshakes.
    #[serde(default = "StreamOptions::default_processing_time")]
    pub processing_time: u32,

    /// Data words (inputs) or golden data words (outputs).
    pub data: Vec<serde_json::Value>,

    /// Metadata words paired with `data` by index.
    #[serde(default)]
    pub metadata: Option<Vec<serde_json::Value>>,
}

/// A complete JSON-described test run.
///
/// # Examples
///
/// ```
/// use cyclebench_core::config::ScenarioConfig;
///
/// let json = r#"{
///     "name": "loopback",
///     "cycles": 20,
///     "dut": { "stream": "stage" },
///     "schemas": {
///         "word": { "name": "word", "fields": [
///             { "name": "a", "kind": "uint", "width": 4 },
///             { "name": "b", "kind": "uint", "width": 4 }
///         ] }
///     },
///     "inputs":  [ { "name": "stage", "data_schema": "word",
///                    "data": [ { "a": 10, "b": 3 }, { "a": 1, "b": 2 } ] } ],
///     "outputs": [ { "name": "stage", "data_schema": "word",
///                    "data": [ { "a": 10, "b": 3 }, { "a": 1, "b": 2 } ] } ]
/// }"#;
///
/// let scenario = ScenarioConfig::from_json_str(json).unwrap();
/// let mut tester = scenario.build().unwrap();
/// let report = tester.run_test(scenario.cycles).unwrap();
/// assert_eq!(report.streams.len(), 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name.
    pub name: String,

    /// Cycles to simulate.
    #[serde(default = "ScenarioConfig::default_cycles")]
    pub cycles: u64,

    /// Settings shared by all streams.
    #[serde(default)]
    pub harness: HarnessConfig,

    /// Reference design.
    pub dut: DutConfig,

    /// Schemas by name.
    pub schemas: BTreeMap<String, RecordSchema>,

    /// Streams driven into the design.
    #[serde(default)]
    pub inputs: Vec<StreamConfig>,

    /// Streams sampled from the design and checked against golden data.
    #[serde(default)]
    pub outputs: Vec<StreamConfig>,
}

impl ScenarioConfig {
    const fn default_cycles() -> u64 {
        defaults::SCENARIO_CYCLES
    }

    /// Parses a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or invalid schemas.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise see
    /// [`ScenarioConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Looks up a schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSchema`] when no schema has that name.
    pub fn schema(&self, name: &str) -> Result<Arc<RecordSchema>, ConfigError> {
        self.schemas
            .get(name)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| ConfigError::UnknownSchema(name.to_string()))
    }

    /// Builds a tester over the reference FIFO design with every stream registered.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::UnknownSchema`] for dangling schema names.
    /// * [`ConfigError::ValueShape`] when a vector does not match its schema.
    /// * [`ConfigError::Harness`] for stream registration failures.
    pub fn build(&self) -> Result<PipelineTester, ConfigError> {
        let driver = self
            .inputs
            .iter()
            .find(|s| s.name == self.dut.stream)
            .ok_or_else(|| {
                HarnessError::InvalidConfig(format!(
                    "no input stream named `{}` to size the design from",
                    self.dut.stream
                ))
            })?;
        let data_schema = self.schema(&driver.data_schema)?;
        let metadata_schema = driver
            .metadata_schema
            .as_deref()
            .map(|name| self.schema(name))
            .transpose()?;

        let dut = FifoStage::new(
            &self.dut.stream,
            data_schema.size(),
            metadata_schema.as_ref().map(|s| s.size()),
            self.dut.depth,
        )?
        .with_style(self.harness.signal_style);

        let mut tester = PipelineTester::with_config(dut, self.harness);
        for stream in &self.inputs {
            let (data, metadata) = self.vectors(stream)?;
            let _ = tester.add_input_stream(&stream.name, data, metadata, stream.processing_time)?;
        }
        for stream in &self.outputs {
            let (data, metadata) = self.vectors(stream)?;
            let _ =
                tester.add_output_stream(&stream.name, data, metadata, stream.processing_time)?;
        }
        Ok(tester)
    }

    fn vectors(
        &self,
        stream: &StreamConfig,
    ) -> Result<(Vec<RecordValue>, Option<Vec<RecordValue>>), ConfigError> {
        let data_schema = self.schema(&stream.data_schema)?;
        let data = stream
            .data
            .iter()
            .map(|v| RecordValue::from_json(&data_schema, v))
            .collect::<Result<Vec<_>, _>>()?;

        let metadata = match (&stream.metadata_schema, &stream.metadata) {
            (Some(name), Some(values)) => {
                let schema = self.schema(name)?;
                Some(
                    values
                        .iter()
                        .map(|v| RecordValue::from_json(&schema, v))
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
            (None, None) => None,
            _ => {
                return Err(HarnessError::InvalidConfig(format!(
                    "stream `{}` must give both metadata_schema and metadata, or neither",
                    stream.name
                ))
                .into());
            }
        };
        Ok((data, metadata))
    }
}
