//! Valid/ready channels.
//!
//! A channel binds a stream name to the four signals of a handshake port:
//! `valid`, `ready`, `data` and optionally `metadata`. Signal names follow
//! `<stream>_<suffix>_<signal>`, where the suffix depends on the signal style
//! and on which side of the design the port sits.

use std::sync::Arc;

use serde::Deserialize;

use crate::common::bits::BitVector;
use crate::common::error::HarnessError;
use crate::record::RecordSchema;
use crate::sim::dut::Dut;

/// Port naming convention of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStyle {
    /// `X_in_*` for ports into the design, `X_out_*` for ports out of it.
    #[default]
    InOut,
    /// `X_s_*` for subordinate (input) ports, `X_m_*` for manager (output) ports.
    #[serde(alias = "sm")]
    SlaveMaster,
}

impl SignalStyle {
    /// Signal-name suffix for a port in `direction`.
    pub const fn suffix(self, direction: Direction) -> &'static str {
        match (self, direction) {
            (Self::InOut, Direction::Input) => "in",
            (Self::InOut, Direction::Output) => "out",
            (Self::SlaveMaster, Direction::Input) => "s",
            (Self::SlaveMaster, Direction::Output) => "m",
        }
    }
}

/// Which way data flows through a channel, seen from the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The harness drives data into the design (producer side).
    Input,
    /// The design drives data out to the harness (consumer side).
    Output,
}

impl Direction {
    /// Lower-case label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Resolved signal names of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSignals {
    /// Valid signal.
    pub valid: String,
    /// Ready signal.
    pub ready: String,
    /// Data signal.
    pub data: String,
    /// Metadata signal, when the channel carries sideband metadata.
    pub metadata: Option<String>,
}

impl ChannelSignals {
    /// Names for stream `name` in `style` and `direction`.
    pub fn resolve(name: &str, style: SignalStyle, direction: Direction, metadata: bool) -> Self {
        let prefix = format!("{name}_{}", style.suffix(direction));
        Self {
            valid: format!("{prefix}_valid"),
            ready: format!("{prefix}_ready"),
            data: format!("{prefix}_data"),
            metadata: metadata.then(|| format!("{prefix}_metadata")),
        }
    }
}

/// A handshake port bound to a design.
#[derive(Debug, Clone)]
pub struct Channel {
    name: String,
    direction: Direction,
    data_schema: Arc<RecordSchema>,
    metadata_schema: Option<Arc<RecordSchema>>,
    signals: ChannelSignals,
}

impl Channel {
    /// Resolves the channel's signals on `dut` and checks their widths.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::MissingSignal`] when the design lacks a required signal.
    /// * [`HarnessError::SignalWidthMismatch`] when `valid`/`ready` are not single bits or
    ///   `data`/`metadata` differ from their schema sizes.
    pub fn bind(
        dut: &dyn Dut,
        name: &str,
        direction: Direction,
        style: SignalStyle,
        data_schema: Arc<RecordSchema>,
        metadata_schema: Option<Arc<RecordSchema>>,
    ) -> Result<Self, HarnessError> {
        let signals =
            ChannelSignals::resolve(name, style, direction, metadata_schema.is_some());

        expect_width(dut, &signals.valid, 1)?;
        expect_width(dut, &signals.ready, 1)?;
        expect_width(dut, &signals.data, data_schema.size())?;
        if let (Some(signal), Some(schema)) = (&signals.metadata, &metadata_schema) {
            expect_width(dut, signal, schema.size())?;
        }

        Ok(Self {
            name: name.to_string(),
            direction,
            data_schema,
            metadata_schema,
            signals,
        })
    }

    /// Stream name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direction of the port.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Schema of the data word.
    pub const fn data_schema(&self) -> &Arc<RecordSchema> {
        &self.data_schema
    }

    /// Schema of the metadata word, if any.
    pub const fn metadata_schema(&self) -> Option<&Arc<RecordSchema>> {
        self.metadata_schema.as_ref()
    }

    /// Resolved signal names.
    pub const fn signals(&self) -> &ChannelSignals {
        &self.signals
    }

    /// Reads one of this channel's signals.
    pub(crate) fn read(&self, dut: &dyn Dut, signal: &str) -> Result<BitVector, HarnessError> {
        dut.read(signal).ok_or_else(|| HarnessError::MissingSignal {
            dut: dut.name().to_string(),
            signal: signal.to_string(),
        })
    }

    /// Reads a single-bit control signal.
    pub(crate) fn read_flag(&self, dut: &dyn Dut, signal: &str) -> Result<bool, HarnessError> {
        self.read(dut, signal).map(|bits| bits.as_bool())
    }
}

fn expect_width(dut: &dyn Dut, signal: &str, expected: usize) -> Result<(), HarnessError> {
    match dut.signal_width(signal) {
        None => Err(HarnessError::MissingSignal {
            dut: dut.name().to_string(),
            signal: signal.to_string(),
        }),
        Some(found) if found != expected => Err(HarnessError::SignalWidthMismatch {
            signal: signal.to_string(),
            expected,
            found,
        }),
        Some(_) => Ok(()),
    }
}
