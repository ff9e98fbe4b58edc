//! Results of a tester run.

use std::fmt;

use crate::stream::channel::Direction;
use crate::stream::transaction::{StreamStats, Transaction};

/// Outcome of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReport {
    /// Stream name.
    pub name: String,
    /// Side of the design the stream sits on.
    pub direction: Direction,
    /// Handshake statistics.
    pub stats: StreamStats,
    /// Accepted items in acceptance order.
    pub transactions: Vec<Transaction>,
}

/// Outcome of a passing `run_test`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    /// Cycles simulated so far, across every `run_test` call.
    pub cycles: u64,
    /// Inputs first, then outputs, each in registration order.
    pub streams: Vec<StreamReport>,
}

impl TestReport {
    /// Report of stream `name` on side `direction`.
    pub fn stream(&self, name: &str, direction: Direction) -> Option<&StreamReport> {
        self.streams
            .iter()
            .find(|s| s.name == name && s.direction == direction)
    }

    /// Handshakes completed across all streams.
    pub fn total_accepted(&self) -> u64 {
        self.streams.iter().map(|s| s.stats.accepted).sum()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ran {} cycles", self.cycles)?;
        for stream in &self.streams {
            write!(
                f,
                "  {:<6} {:<16} {}",
                stream.direction.label(),
                stream.name,
                stream.stats
            )?;
            if stream.stats.accepted > 1 {
                write!(f, " throughput={:.3}", stream.stats.throughput())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
