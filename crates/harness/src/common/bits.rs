//! Arbitrary-width bit vectors.
//!
//! This module defines the wire representation shared by the codec and the DUT signals. It provides:
//! 1. **Storage:** Little-endian 64-bit words with bit 0 as the least significant bit.
//! 2. **Slicing:** Extracting and splicing sub-ranges, and MSB-first concatenation.
//! 3. **Conversion:** Unsigned, two's-complement and byte-sequence views of the bits.

use std::fmt;

use super::error::CodecError;

const WORD_BITS: usize = 64;

/// A fixed-width sequence of bits.
///
/// Bits at positions `>= width` are always zero, so two vectors compare equal
/// exactly when they have the same width and the same bits.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    width: usize,
    words: Vec<u64>,
}

impl BitVector {
    /// Creates an all-zero vector of `width` bits.
    pub fn zeros(width: usize) -> Self {
        Self {
            width,
            words: vec![0; width.div_ceil(WORD_BITS)],
        }
    }

    /// Creates a single-bit vector holding `value`.
    pub fn from_bool(value: bool) -> Self {
        let mut bits = Self::zeros(1);
        bits.set_bit(0, value);
        bits
    }

    /// Creates a vector from an unsigned value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitWidth`] when `value` needs more than `width` bits.
    pub fn from_u128(width: usize, value: u128) -> Result<Self, CodecError> {
        if width < 128 && value >> width != 0 {
            return Err(CodecError::BitWidth {
                width,
                value: value.to_string(),
            });
        }
        let mut bits = Self::zeros(width);
        for (i, word) in bits.words.iter_mut().take(2).enumerate() {
            *word = (value >> (i * WORD_BITS)) as u64;
        }
        bits.normalize();
        Ok(bits)
    }

    /// Creates a two's-complement vector from a signed value.
    ///
    /// Widths above 128 bits are sign-extended.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitWidth`] when `value` is outside `[-2^(w-1), 2^(w-1) - 1]`.
    pub fn from_i128(width: usize, value: i128) -> Result<Self, CodecError> {
        if width == 0 || (width < 128 && !signed_fits(width, value)) {
            return Err(CodecError::BitWidth {
                width,
                value: value.to_string(),
            });
        }
        let mut bits = Self::zeros(width);
        let raw = value as u128;
        for i in 0..width {
            let bit = if i < 128 { (raw >> i) & 1 == 1 } else { value < 0 };
            bits.set_bit(i, bit);
        }
        Ok(bits)
    }

    /// Width of the vector in bits.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Reads bit `index` (0 is the least significant bit).
    ///
    /// Out-of-range indices read as zero.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        index < self.width && (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Writes bit `index`. Out-of-range writes are ignored.
    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        if index >= self.width {
            return;
        }
        let mask = 1u64 << (index % WORD_BITS);
        if value {
            self.words[index / WORD_BITS] |= mask;
        } else {
            self.words[index / WORD_BITS] &= !mask;
        }
    }

    /// Extracts `width` bits starting at bit `lo`.
    pub fn slice(&self, lo: usize, width: usize) -> Self {
        let mut out = Self::zeros(width);
        for i in 0..width {
            out.set_bit(i, self.bit(lo + i));
        }
        out
    }

    /// Overwrites the bits starting at `lo` with `other`.
    pub fn splice(&mut self, lo: usize, other: &Self) {
        for i in 0..other.width {
            self.set_bit(lo + i, other.bit(i));
        }
    }

    /// Concatenates `parts`, the first part occupying the most significant bits.
    pub fn concat(parts: &[Self]) -> Self {
        let total = parts.iter().map(Self::width).sum();
        let mut out = Self::zeros(total);
        let mut hi = total;
        for part in parts {
            hi -= part.width;
            out.splice(hi, part);
        }
        out
    }

    /// Lower 128 bits as an unsigned integer.
    pub fn to_u128(&self) -> u128 {
        self.words
            .iter()
            .take(2)
            .enumerate()
            .fold(0u128, |acc, (i, w)| acc | (u128::from(*w) << (i * WORD_BITS)))
    }

    /// Value as a two's-complement integer sign-extended from `width`.
    ///
    /// Vectors wider than 128 bits are truncated to their low 128 bits.
    pub fn to_i128(&self) -> i128 {
        let raw = self.to_u128();
        if self.width == 0 || self.width >= 128 {
            return raw as i128;
        }
        let shift = 128 - self.width;
        ((raw << shift) as i128) >> shift
    }

    /// True when no bit is set.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Signal-level truth value: any bit set.
    #[inline]
    pub fn as_bool(&self) -> bool {
        !self.is_zero()
    }

    /// Number of bytes needed to hold the vector.
    #[inline]
    pub const fn byte_len(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// Builds a vector from a big-endian byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitWidth`] when a set bit lands at or above `width`.
    pub fn from_be_bytes(width: usize, bytes: &[u8]) -> Result<Self, CodecError> {
        let le: Vec<u8> = bytes.iter().rev().copied().collect();
        Self::from_le_bytes(width, &le)
    }

    /// Builds a vector from a little-endian byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitWidth`] when a set bit lands at or above `width`.
    pub fn from_le_bytes(width: usize, bytes: &[u8]) -> Result<Self, CodecError> {
        let mut out = Self::zeros(width);
        for (byte_idx, byte) in bytes.iter().enumerate() {
            for bit in 0..8 {
                if (byte >> bit) & 1 == 0 {
                    continue;
                }
                let index = byte_idx * 8 + bit;
                if index >= width {
                    return Err(CodecError::BitWidth {
                        width,
                        value: format!("{} bytes", bytes.len()),
                    });
                }
                out.set_bit(index, true);
            }
        }
        Ok(out)
    }

    /// Big-endian bytes, `ceil(width / 8)` of them.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut bytes = self.to_le_bytes();
        bytes.reverse();
        bytes
    }

    /// Little-endian bytes, `ceil(width / 8)` of them.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        (0..self.byte_len())
            .map(|b| (self.words[b / 8] >> ((b % 8) * 8)) as u8)
            .collect()
    }

    fn normalize(&mut self) {
        let tail = self.width % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

/// Checks whether `value` fits a `width`-bit two's-complement field.
pub(crate) const fn signed_fits(width: usize, value: i128) -> bool {
    if width >= 128 {
        return true;
    }
    let min = -(1i128 << (width - 1));
    let max = (1i128 << (width - 1)) - 1;
    value >= min && value <= max
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b")?;
        if self.width == 0 {
            return write!(f, "0");
        }
        for i in (0..self.width).rev() {
            write!(f, "{}", u8::from(self.bit(i)))?;
        }
        Ok(())
    }
}

impl fmt::LowerHex for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        let nibbles = self.width.div_ceil(4).max(1);
        for n in (0..nibbles).rev() {
            let nibble = (0..4).fold(0u8, |acc, b| acc | (u8::from(self.bit(n * 4 + b)) << b));
            write!(f, "{nibble:x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector<{}>({:x})", self.width, self)
    }
}
