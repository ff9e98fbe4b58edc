//! Handshake transactions and per-stream statistics.

use std::fmt;

use crate::record::RecordValue;

/// One accepted handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Decoded data word.
    pub data: RecordValue,
    /// Decoded metadata word, when the channel carries one.
    pub metadata: Option<RecordValue>,
    /// Edge at which valid and ready were both observed.
    pub cycle: u64,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} {}", self.cycle, self.data)?;
        if let Some(meta) = &self.metadata {
            write!(f, " / {meta}")?;
        }
        Ok(())
    }
}

/// Handshake statistics of one stream agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Handshakes completed.
    pub accepted: u64,
    /// Edges where the producer offered data that was not taken.
    pub stall_cycles: u64,
    /// Edges where the agent had nothing to do.
    pub idle_cycles: u64,
    /// Edges spent in throughput-shaping bubbles.
    pub bubble_cycles: u64,
    /// Cycle of the first handshake.
    pub first_accept: Option<u64>,
    /// Cycle of the latest handshake.
    pub last_accept: Option<u64>,
    /// Smallest distance between two consecutive handshakes.
    pub min_interval: Option<u64>,
}

impl StreamStats {
    /// Records a handshake at `cycle`.
    pub fn record_accept(&mut self, cycle: u64) {
        if let Some(last) = self.last_accept {
            let gap = cycle - last;
            self.min_interval = Some(self.min_interval.map_or(gap, |m| m.min(gap)));
        }
        if self.first_accept.is_none() {
            self.first_accept = Some(cycle);
        }
        self.last_accept = Some(cycle);
        self.accepted += 1;
    }

    /// Handshakes per cycle between the first and the latest handshake.
    pub fn throughput(&self) -> f64 {
        match (self.first_accept, self.last_accept) {
            (Some(first), Some(last)) if last > first => {
                (self.accepted - 1) as f64 / (last - first) as f64
            }
            _ => 0.0,
        }
    }
}

impl fmt::Display for StreamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accepted={} stalls={} idle={} bubbles={}",
            self.accepted, self.stall_cycles, self.idle_cycles, self.bubble_cycles
        )?;
        if let Some(gap) = self.min_interval {
            write!(f, " min_interval={gap}")?;
        }
        Ok(())
    }
}
