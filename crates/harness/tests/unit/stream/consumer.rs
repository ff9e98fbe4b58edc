//! # Consumer Tests
//!
//! Throttled `ready`, decoding with metadata, and buffered FIFO delivery.

use cyclebench_core::config::StreamOptions;
use cyclebench_core::sim::Simulator;
use cyclebench_core::stream::{SampleState, StreamAgent};
use pretty_assertions::assert_eq;

use crate::common::harness::{
    Loopback, init_tracing, tag, tag_schema, word, word_fifo, word_schema, words,
};

#[test]
fn test_throttled_consumer_spaces_acceptances() {
    let mut lb = Loopback::new(2, 1, 3);
    lb.feed(words(6));
    lb.sim.run(40).unwrap();

    let consumer = lb.sim.consumer(lb.consumer).unwrap();
    assert_eq!(consumer.stats().first_accept, Some(2));
    assert_eq!(consumer.stats().min_interval, Some(3));
    assert_eq!(consumer.stats().bubble_cycles, 2 + 6 * 2);

    let received = lb.drain();
    let cycles: Vec<u64> = received.iter().map(|(c, _)| *c).collect();
    assert_eq!(cycles, vec![2, 5, 8, 11, 14, 17]);
    let values: Vec<_> = received.into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, words(6));
}

#[test]
fn test_consumer_starts_throttled() {
    let lb = Loopback::new(2, 1, 4);
    let consumer = lb.sim.consumer(lb.consumer).unwrap();
    assert_eq!(consumer.state(), SampleState::Throttle { remaining: 3 });
}

#[test]
fn test_backpressure_stalls_producer() {
    let mut lb = Loopback::new(1, 1, 4);
    lb.feed(words(4));
    lb.sim.run(30).unwrap();

    let producer = lb.sim.producer(lb.producer).unwrap();
    assert!(producer.stats().stall_cycles > 0);
    assert_eq!(producer.stats().accepted, 4);
    assert_eq!(lb.drain().len(), 4);
}

#[test]
fn test_metadata_travels_with_data() {
    init_tracing();
    let mut sim = Simulator::new(word_fifo(2, true));
    let options = StreamOptions::default();
    let p = sim
        .add_producer("s", word_schema(), Some(tag_schema()), options)
        .unwrap();
    let c = sim
        .add_consumer("s", word_schema(), Some(tag_schema()), options)
        .unwrap();

    sim.produce(p, word(1, 2), Some(tag(false, 5))).unwrap();
    sim.produce(p, word(3, 4), Some(tag(true, 6))).unwrap();

    let first = sim.consume(c, 10).unwrap();
    assert_eq!(first.data, word(1, 2));
    assert_eq!(first.metadata, Some(tag(false, 5)));

    let second = sim.consume(c, 10).unwrap();
    assert_eq!(second.metadata, Some(tag(true, 6)));
    assert!(second.cycle > first.cycle);
}

#[test]
fn test_try_consume_and_buffering() {
    let mut lb = Loopback::new(2, 1, 1);
    lb.feed(words(3));
    lb.sim.run(10).unwrap();

    assert_eq!(lb.sim.consumer(lb.consumer).unwrap().buffered(), 3);
    let consumer = lb.sim.consumers().first().unwrap();
    assert_eq!(consumer.stats().accepted, 3);

    let first = lb.sim.consume(lb.consumer, 0).unwrap();
    assert_eq!(first.data, words(3)[0]);
    assert_eq!(lb.sim.consume_all(lb.consumer).unwrap().len(), 2);
    assert!(lb.sim.consume_all(lb.consumer).unwrap().is_empty());
}

#[test]
fn test_consumer_without_traffic_stays_ready() {
    let mut lb = Loopback::new(2, 1, 1);
    lb.sim.run(5).unwrap();
    let consumer = lb.sim.consumer(lb.consumer).unwrap();
    assert_eq!(consumer.state(), SampleState::Ready);
    assert_eq!(consumer.stats().idle_cycles, 5);
    assert!(lb.drain().is_empty());
}
