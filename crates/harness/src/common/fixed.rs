//! Fixed-point and Gray-code helpers.
//!
//! The arithmetic here matches the rounding rules of SystemVerilog real-to-integer
//! conversion: halves round away from zero. It provides:
//! 1. **Quantization:** Converting between reals and scaled integers.
//! 2. **Comparison:** Tolerance checks expressed in least-significant bits.
//! 3. **Gray code:** Conversions used by clock-domain-crossing pointer checks.

/// Default number of fractional bits in the design's fixed-point format.
pub const DEFAULT_FRACTIONAL_BITS: u32 = 14;

/// Default total width of a fixed-point field (sign included).
pub const DEFAULT_FIXED_WIDTH: usize = 25;

/// Default comparison tolerance in LSBs.
pub const DEFAULT_TOLERANCE_LSB: f64 = 1.0;

/// Rounds half away from zero (`2.5 -> 3`, `-2.5 -> -3`).
#[inline]
pub fn round_away(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

/// Smallest representable step for `fractional_bits`.
#[inline]
pub fn resolution(fractional_bits: u32) -> f64 {
    (-f64::from(fractional_bits)).exp2()
}

/// Scales `value` by `2^fractional_bits` and rounds away from zero.
#[inline]
pub fn to_fixed(value: f64, fractional_bits: u32) -> i128 {
    round_away(value * f64::from(fractional_bits).exp2()) as i128
}

/// Inverse of [`to_fixed`].
#[inline]
pub fn to_float(value: i128, fractional_bits: u32) -> f64 {
    value as f64 / f64::from(fractional_bits).exp2()
}

/// Rounds `value` to the closest representable fixed-point real.
#[inline]
pub fn quantize(value: f64, fractional_bits: u32) -> f64 {
    to_float(to_fixed(value, fractional_bits), fractional_bits)
}

/// Representable `(min, max)` reals of a `width`-bit signed field.
pub fn fixed_range(width: usize, fractional_bits: u32) -> (f64, f64) {
    let half = ((width as f64) - 1.0).exp2();
    let step = resolution(fractional_bits);
    (-half * step, (half - 1.0) * step)
}

/// True when `a` and `b` differ by at most `tolerance_lsb` steps.
pub fn within_tolerance(a: f64, b: f64, tolerance_lsb: f64, fractional_bits: u32) -> bool {
    (a - b).abs() <= tolerance_lsb * resolution(fractional_bits)
}

/// Binary to reflected Gray code.
#[inline]
pub const fn binary_to_gray(value: u64) -> u64 {
    value ^ (value >> 1)
}

/// Reflected Gray code back to binary.
pub const fn gray_to_binary(gray: u64) -> u64 {
    let mut value = gray;
    let mut mask = gray >> 1;
    while mask != 0 {
        value ^= mask;
        mask >>= 1;
    }
    value
}

/// True when `a` and `b` differ in exactly one bit position.
#[inline]
pub const fn differ_by_one_bit(a: u64, b: u64) -> bool {
    (a ^ b).is_power_of_two()
}
