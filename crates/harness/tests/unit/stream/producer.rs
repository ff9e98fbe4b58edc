//! # Producer Tests
//!
//! Queueing, synchronous encoding errors, metadata presence and drive behavior.

use cyclebench_core::common::{BitVector, CodecError, HarnessError};
use cyclebench_core::config::StreamOptions;
use cyclebench_core::sim::Simulator;
use cyclebench_core::stream::{DriveState, StreamAgent};
use pretty_assertions::assert_eq;

use crate::common::harness::{
    Loopback, init_tracing, tag, tag_schema, word, word_fifo, word_schema, words,
};
use crate::common::mocks::sink::ScriptedSink;

#[test]
fn test_produce_is_non_blocking() {
    let mut lb = Loopback::new(2, 1, 1);
    lb.feed(words(5));
    assert_eq!(lb.sim.cycle(), 0);
    let producer = lb.sim.producer(lb.producer).unwrap();
    assert_eq!(producer.queued(), 5);
    assert_eq!(producer.state(), DriveState::Idle);
}

#[test]
fn test_encoding_errors_surface_at_produce() {
    let mut lb = Loopback::new(2, 1, 1);
    let err = lb.sim.produce(lb.producer, word(16, 0), None).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Codec(CodecError::WidthMismatch { .. })
    ));
    assert_eq!(lb.sim.producer(lb.producer).unwrap().queued(), 0);
}

#[test]
fn test_metadata_presence_must_match_channel() {
    init_tracing();
    let mut sim = Simulator::new(word_fifo(2, true));
    let with_meta = sim
        .add_producer("s", word_schema(), Some(tag_schema()), StreamOptions::default())
        .unwrap();
    assert_eq!(
        sim.produce(with_meta, word(1, 1), None),
        Err(HarnessError::MissingMetadata {
            stream: "s".to_string(),
        })
    );
    assert!(sim.produce(with_meta, word(1, 1), Some(tag(true, 2))).is_ok());

    let mut lb = Loopback::new(2, 1, 1);
    assert_eq!(
        lb.sim.produce(lb.producer, word(1, 1), Some(tag(false, 0))),
        Err(HarnessError::UnexpectedMetadata {
            stream: "s".to_string(),
        })
    );
}

#[test]
fn test_back_to_back_transfers_with_unit_processing_time() {
    let mut lb = Loopback::new(2, 1, 1);
    lb.feed(words(5));
    lb.sim.run(8).unwrap();

    let producer = lb.sim.producer(lb.producer).unwrap();
    let cycles: Vec<u64> = producer.sent().iter().map(|t| t.cycle).collect();
    assert_eq!(cycles, vec![0, 1, 2, 3, 4]);
    assert_eq!(producer.stats().min_interval, Some(1));
    assert!(producer.is_drained());

    let consumed: Vec<u64> = lb.drain().into_iter().map(|(c, _)| c).collect();
    assert_eq!(consumed, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_valid_drops_once_queue_drains() {
    let (sink, log) = ScriptedSink::new("s", 8, vec![]);
    let mut sim = Simulator::new(sink);
    let id = sim
        .add_producer("s", word_schema(), None, StreamOptions::default())
        .unwrap();
    sim.produce(id, word(3, 4), None).unwrap();
    sim.produce(id, word(5, 6), None).unwrap();
    sim.run(4).unwrap();

    let valid: Vec<bool> = log.samples().iter().map(|s| s.valid).collect();
    assert_eq!(valid, vec![true, true, false, false]);
    assert_eq!(sim.dut().read("s_in_valid"), Some(BitVector::from_bool(false)));
    assert_eq!(sim.producer(id).unwrap().state(), DriveState::Idle);

    // Items queued later are picked up again.
    sim.produce(id, word(7, 8), None).unwrap();
    sim.tick().unwrap();
    assert_eq!(log.accepted().len(), 3);
}

#[test]
fn test_idle_cycles_are_counted() {
    let (sink, _log) = ScriptedSink::new("s", 8, vec![]);
    let mut sim = Simulator::new(sink);
    let id = sim
        .add_producer("s", word_schema(), None, StreamOptions::default())
        .unwrap();
    sim.run(3).unwrap();
    let stats = sim.producer(id).unwrap().stats().clone();
    assert_eq!(stats.idle_cycles, 3);
    assert_eq!(stats.accepted, 0);
}
