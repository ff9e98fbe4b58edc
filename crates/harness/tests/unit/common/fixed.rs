//! # Fixed-Point Tests
//!
//! Rounding, quantization, tolerance and Gray-code helpers.

use cyclebench_core::common::fixed::*;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(2.5, 3.0)]
#[case(-2.5, -3.0)]
#[case(2.4, 2.0)]
#[case(-2.6, -3.0)]
#[case(0.0, 0.0)]
fn test_round_away(#[case] x: f64, #[case] expected: f64) {
    assert!((round_away(x) - expected).abs() < f64::EPSILON);
}

#[test]
fn test_default_format_encodes_one_and_a_half() {
    assert_eq!(to_fixed(1.5, DEFAULT_FRACTIONAL_BITS), 24576);
    assert!((to_float(24576, DEFAULT_FRACTIONAL_BITS) - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_quantize_snaps_to_resolution() {
    let step = resolution(2);
    assert!((step - 0.25).abs() < f64::EPSILON);
    assert!((quantize(0.3, 2) - 0.25).abs() < f64::EPSILON);
    assert!((quantize(0.375, 2) - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_fixed_range_of_default_format() {
    let (min, max) = fixed_range(DEFAULT_FIXED_WIDTH, DEFAULT_FRACTIONAL_BITS);
    assert!((min - -1024.0).abs() < f64::EPSILON);
    assert!((max - (1024.0 - resolution(DEFAULT_FRACTIONAL_BITS))).abs() < f64::EPSILON);
}

#[test]
fn test_within_tolerance_counts_lsbs() {
    let lsb = resolution(DEFAULT_FRACTIONAL_BITS);
    assert!(within_tolerance(1.0, 1.0 + lsb, DEFAULT_TOLERANCE_LSB, DEFAULT_FRACTIONAL_BITS));
    assert!(!within_tolerance(1.0, 1.0 + 3.0 * lsb, DEFAULT_TOLERANCE_LSB, DEFAULT_FRACTIONAL_BITS));
}

#[test]
fn test_gray_sequence_changes_one_bit_per_step() {
    for i in 0..255u64 {
        assert!(differ_by_one_bit(binary_to_gray(i), binary_to_gray(i + 1)));
    }
}

proptest! {
    #[test]
    fn prop_gray_round_trip(value in any::<u64>()) {
        prop_assert_eq!(gray_to_binary(binary_to_gray(value)), value);
    }

    #[test]
    fn prop_quantize_is_within_half_lsb(x in -1000.0f64..1000.0, f in 0u32..20) {
        prop_assert!((quantize(x, f) - x).abs() <= resolution(f) / 2.0 + 1e-12);
    }
}
