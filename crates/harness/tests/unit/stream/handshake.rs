//! # Handshake Protocol Tests
//!
//! Backpressure safety, throughput shaping, acceptance ordering and the
//! offered-data stability check.

use cyclebench_core::common::{BitVector, HarnessError};
use cyclebench_core::config::StreamOptions;
use cyclebench_core::record::pack;
use cyclebench_core::sim::Simulator;
use cyclebench_core::stream::StreamAgent;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::harness::{Loopback, init_tracing, word, word_schema, words};
use crate::common::mocks::sink::{ScriptedSink, SinkLog};

fn packed(a: u8, b: u8) -> BitVector {
    pack(&word_schema(), &word(a, b)).unwrap()
}

/// Producer on a sink that holds `ready` low for `stall` edges.
fn stalled_producer(stall: usize, options: StreamOptions) -> (Simulator, SinkLog) {
    init_tracing();
    let (sink, log) = ScriptedSink::stalled("s", 8, stall);
    let mut sim = Simulator::new(sink);
    let id = sim.add_producer("s", word_schema(), None, options).unwrap();
    sim.produce(id, word(10, 3), None).unwrap();
    sim.produce(id, word(1, 2), None).unwrap();
    (sim, log)
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[case(7)]
fn test_backpressure_holds_offer_unchanged(#[case] stall: usize) {
    let (mut sim, log) = stalled_producer(stall, StreamOptions::default());
    sim.run(stall as u64 + 2).unwrap();

    let samples = log.samples();
    for sample in &samples[..=stall] {
        assert!(sample.valid, "valid dropped at edge {}", sample.edge);
        assert_eq!(sample.data, packed(10, 3));
    }
    assert_eq!(
        log.accepted(),
        vec![(stall as u64, packed(10, 3)), (stall as u64 + 1, packed(1, 2))]
    );

    let stats = sim.producers()[0].stats().clone();
    assert_eq!(stats.stall_cycles, stall as u64);
    assert_eq!(stats.first_accept, Some(stall as u64));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(10)]
fn test_processing_time_spaces_handshakes(#[case] p: u32) {
    let mut lb = Loopback::new(2, p, 1);
    lb.feed(words(5));
    lb.sim.run(u64::from(p) * 5 + 2).unwrap();

    let sent = lb.sim.producer(lb.producer).unwrap().sent().to_vec();
    assert_eq!(sent.len(), 5);
    for pair in sent.windows(2) {
        assert_eq!(pair[1].cycle - pair[0].cycle, u64::from(p));
    }
}

#[rstest]
#[case(1)]
#[case(9)]
#[case(10)]
#[case(35)]
#[case(100)]
#[case(200)]
fn test_scenario_d_throughput_bound(#[case] cycles: u64) {
    let mut lb = Loopback::new(2, 10, 1);
    lb.feed(words(12));
    lb.sim.run(cycles).unwrap();

    let accepted = lb.sim.producer(lb.producer).unwrap().stats().accepted;
    assert!(accepted <= cycles / 10 + 1);
    assert!(lb.drain().len() as u64 <= cycles / 10 + 1);
    if cycles >= 200 {
        assert_eq!(accepted, 12);
    }
}

#[test]
fn test_unstable_data_is_flagged() {
    let (mut sim, _log) = stalled_producer(5, StreamOptions::default());
    sim.run(2).unwrap();
    sim.dut_mut().write("s_in_data", packed(0, 0)).unwrap();

    assert_eq!(
        sim.tick(),
        Err(HarnessError::UnstableOffer {
            stream: "s".to_string(),
            signal: "s_in_data".to_string(),
            cycle: 2,
        })
    );
}

#[test]
fn test_dropped_valid_is_flagged() {
    let (mut sim, _log) = stalled_producer(5, StreamOptions::default());
    sim.run(1).unwrap();
    sim.dut_mut()
        .write("s_in_valid", BitVector::from_bool(false))
        .unwrap();
    assert!(matches!(
        sim.tick(),
        Err(HarnessError::UnstableOffer { ref signal, cycle: 1, .. }) if signal == "s_in_valid"
    ));
}

#[test]
fn test_stability_check_can_be_disabled() {
    let options = StreamOptions {
        check_stability: false,
        ..StreamOptions::default()
    };
    let (mut sim, log) = stalled_producer(5, options);
    sim.run(2).unwrap();
    sim.dut_mut().write("s_in_data", packed(0, 0)).unwrap();
    sim.run(4).unwrap();

    // The design saw the corrupted word; only an output check would notice.
    assert_eq!(log.accepted().first(), Some(&(5, packed(0, 0))));
    let sent = sim.producers()[0].sent().to_vec();
    assert_eq!(sent[0].data, word(10, 3));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_acceptances_arrive_in_order(
        count in 1usize..12,
        depth in 1usize..4,
        producer_time in 1u32..4,
        consumer_time in 1u32..4,
    ) {
        let mut lb = Loopback::new(depth, producer_time, consumer_time);
        lb.feed(words(count));
        let budget = count as u64 * u64::from(producer_time + consumer_time + 2) + 16;
        lb.sim.run(budget).unwrap();

        let received = lb.drain();
        let cycles: Vec<u64> = received.iter().map(|(c, _)| *c).collect();
        prop_assert!(cycles.windows(2).all(|w| w[0] < w[1]));
        let values: Vec<_> = received.into_iter().map(|(_, v)| v).collect();
        prop_assert_eq!(values, words(count));
    }
}
