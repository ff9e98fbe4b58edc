//! # Reference Model Tests
//!
//! FIFO stage behavior driven directly through the `Dut` interface.

use cyclebench_core::common::{BitVector, HarnessError};
use cyclebench_core::models::{FifoStage, SignalTable};
use cyclebench_core::sim::Dut;
use cyclebench_core::stream::SignalStyle;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn byte(value: u128) -> BitVector {
    BitVector::from_u128(8, value).unwrap()
}

fn flag(dut: &FifoStage, signal: &str) -> bool {
    dut.read(signal).is_some_and(|b| b.as_bool())
}

/// Pushes `value` with `out_ready` low, one edge.
fn push(dut: &mut FifoStage, value: u128) {
    dut.write("s_in_valid", BitVector::from_bool(true)).unwrap();
    dut.write("s_in_data", byte(value)).unwrap();
    dut.settle();
    dut.clock_edge();
    dut.settle();
}

#[test]
fn test_fills_then_backpressures() {
    let mut fifo = FifoStage::new("s", 8, None, 2).unwrap();
    assert!(flag(&fifo, "s_in_ready"));
    assert!(!flag(&fifo, "s_out_valid"));

    push(&mut fifo, 1);
    push(&mut fifo, 2);
    assert_eq!(fifo.occupancy(), 2);
    assert!(!flag(&fifo, "s_in_ready"));

    // Full: a third offer is not taken.
    push(&mut fifo, 3);
    assert_eq!(fifo.occupancy(), 2);
    assert_eq!(fifo.read("s_out_data"), Some(byte(1)));
    assert_eq!(fifo.edges(), 3);
}

#[test]
fn test_drains_in_order() {
    let mut fifo = FifoStage::new("s", 8, None, 3).unwrap();
    for value in [7, 8, 9] {
        push(&mut fifo, value);
    }
    fifo.write("s_in_valid", BitVector::from_bool(false)).unwrap();
    fifo.write("s_out_ready", BitVector::from_bool(true)).unwrap();

    let mut seen = Vec::new();
    while flag(&fifo, "s_out_valid") {
        seen.push(fifo.read("s_out_data").unwrap().to_u128());
        fifo.clock_edge();
        fifo.settle();
    }
    assert_eq!(seen, vec![7, 8, 9]);
    assert_eq!(fifo.read("s_out_data"), Some(byte(0)));
}

#[test]
fn test_full_fifo_does_not_push_while_popping() {
    let mut fifo = FifoStage::new("s", 8, None, 1).unwrap();
    push(&mut fifo, 4);
    fifo.write("s_out_ready", BitVector::from_bool(true)).unwrap();
    fifo.write("s_in_data", byte(5)).unwrap();
    fifo.settle();
    fifo.clock_edge();
    fifo.settle();
    assert_eq!(fifo.occupancy(), 0);
}

#[test]
fn test_metadata_follows_data() {
    let mut fifo = FifoStage::new("s", 8, Some(2), 2).unwrap();
    fifo.write("s_in_metadata", BitVector::from_u128(2, 3).unwrap())
        .unwrap();
    push(&mut fifo, 6);
    assert_eq!(
        fifo.read("s_out_metadata"),
        Some(BitVector::from_u128(2, 3).unwrap())
    );
}

#[test]
fn test_transform_is_truncated_to_data_width() {
    let mut fifo = FifoStage::new("s", 8, None, 2)
        .unwrap()
        .with_transform(|bits: &BitVector| BitVector::concat(&[bits.clone(), bits.clone()]));
    push(&mut fifo, 0xA5);
    assert_eq!(fifo.read("s_out_data").map(|b| b.width()), Some(8));
}

#[rstest]
#[case(SignalStyle::InOut, "s_in_valid", "s_out_data")]
#[case(SignalStyle::SlaveMaster, "s_s_valid", "s_m_data")]
fn test_port_names_follow_style(
    #[case] style: SignalStyle,
    #[case] input: &str,
    #[case] output: &str,
) {
    let fifo = FifoStage::new("s", 8, None, 2).unwrap().with_style(style);
    assert_eq!(fifo.style(), style);
    assert_eq!(fifo.signal_width(input), Some(1));
    assert_eq!(fifo.signal_width(output), Some(8));
    assert_eq!(fifo.name(), "s_fifo");
}

#[test]
fn test_writes_are_width_checked() {
    let mut fifo = FifoStage::new("s", 8, None, 2).unwrap();
    assert_eq!(
        fifo.write("s_in_data", BitVector::from_bool(true)),
        Err(HarnessError::SignalWidthMismatch {
            signal: "s_in_data".to_string(),
            expected: 8,
            found: 1,
        })
    );
    assert!(matches!(
        fifo.write("nope", byte(0)),
        Err(HarnessError::MissingSignal { .. })
    ));
}

#[test]
fn test_zero_width_data_is_rejected() {
    assert!(matches!(
        FifoStage::new("s", 0, None, 2),
        Err(HarnessError::InvalidConfig(_))
    ));
}

#[test]
fn test_signal_table_sets_are_resized() {
    let mut table = SignalTable::new();
    table.declare("x", 4);
    table.set("x", &byte(0xFF));
    assert_eq!(table.read("x"), Some(BitVector::from_u128(4, 0xF).unwrap()));
    table.set("unknown", &byte(1));
    assert_eq!(table.names().collect::<Vec<_>>(), vec!["x"]);
    assert!(!table.flag("unknown"));
}
