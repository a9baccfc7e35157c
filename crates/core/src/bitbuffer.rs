//! Growable, bit-addressable byte storage.
//!
//! A `BitBuffer` is the in-memory form of a compressed stream. Bits are
//! addressed MSB-first: bit 0 is the highest-order bit of byte 0, bit 8 the
//! highest-order bit of byte 1, and so on.
//!
//! # Padding Rules
//! - Storage is zero-filled, so the unused low-order bits of the final
//!   partial byte are zero when saved
//! - The buffer does not persist its bit count; a reloaded buffer always
//!   holds a whole number of bytes and the caller decides where the data ends
//!
//! # Example
//! ```
//! use prefix_transcode_core::bitbuffer::BitBuffer;
//!
//! let mut buffer = BitBuffer::new();
//! for bit in [true, false, true, true, true] {
//!     buffer.append_bit(bit);
//! }
//! // 10111 -> padded to 10111000
//! assert_eq!(buffer.bit_count(), 5);
//! assert_eq!(buffer.as_bytes(), &[0b1011_1000]);
//! assert!(buffer.get_bit(2).unwrap());
//! ```

use std::io::{Read, Write};

use crate::error::{BitBufferError, Result};

/// Capacity, in bytes, of a freshly created buffer.
pub const START_CAPACITY: usize = 4;

/// Growable bit buffer.
///
/// # Invariants
/// - `data.len()` is the capacity in bytes and is never zero
/// - `bit_count <= data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitBuffer {
    /// Backing store, zero-filled beyond the last written bit
    data: Vec<u8>,
    /// Number of logical bits
    bit_count: usize,
}

impl BitBuffer {
    /// Create an empty buffer with the starting capacity.
    pub fn new() -> Self {
        Self::with_capacity(START_CAPACITY)
    }

    /// Create an empty buffer with room for `bytes` bytes before growing.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: vec![0; bytes.max(1)],
            bit_count: 0,
        }
    }

    /// Create a buffer holding exactly the bits of `bytes`.
    ///
    /// Equivalent to appending each byte's eight bits high-bit-first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::new();
        }
        Self {
            data: bytes.to_vec(),
            bit_count: bytes.len() * 8,
        }
    }

    /// Read every byte from `source` into a new buffer.
    ///
    /// The resulting bit count is always a multiple of 8.
    pub fn load<R: Read>(mut source: R) -> Result<Self> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Write the `ceil(bit_count / 8)` persisted bytes to `sink`.
    pub fn save<W: Write>(&self, mut sink: W) -> Result<()> {
        sink.write_all(self.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Number of logical bits stored.
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Capacity of the backing store, in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    /// The bytes that hold the logical bits, including any padding in the
    /// final partial byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.bit_count.div_ceil(8)]
    }

    /// Consume the buffer and return its persisted bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.truncate(self.bit_count.div_ceil(8));
        self.data
    }

    /// Read the bit at `idx`.
    ///
    /// # Errors
    /// `BitBufferError::IndexOutOfRange` if `idx >= bit_count`.
    pub fn get_bit(&self, idx: usize) -> Result<bool> {
        if idx >= self.bit_count {
            return Err(BitBufferError::IndexOutOfRange {
                index: idx,
                limit: self.bit_count,
            }
            .into());
        }
        Ok(self.bit_at(idx))
    }

    /// Overwrite the bit at `idx`, leaving its neighbours untouched.
    ///
    /// Any index inside the current capacity is accepted, including ones
    /// past the logical bit count; this does not change `bit_count`.
    ///
    /// # Errors
    /// `BitBufferError::IndexOutOfRange` if `idx >= capacity * 8`.
    pub fn set_bit(&mut self, idx: usize, value: bool) -> Result<()> {
        let limit = self.data.len() * 8;
        if idx >= limit {
            return Err(BitBufferError::IndexOutOfRange { index: idx, limit }.into());
        }
        self.put_bit(idx, value);
        Ok(())
    }

    /// Append one bit, growing the backing store if it is full.
    pub fn append_bit(&mut self, value: bool) {
        if self.bit_count >= self.data.len() * 8 {
            self.grow();
        }
        self.put_bit(self.bit_count, value);
        self.bit_count += 1;
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// `BitBufferError::InvalidBitCount` if `count > 64`.
    pub fn append_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitBufferError::InvalidBitCount(count).into());
        }
        for shift in (0..count).rev() {
            self.append_bit((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    /// Read `count` bits starting at `idx` as an MSB-first integer.
    ///
    /// # Errors
    /// - `BitBufferError::InvalidBitCount` if `count > 64`
    /// - `BitBufferError::IndexOutOfRange` if the field extends past `bit_count`
    pub fn get_bits(&self, idx: usize, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitBufferError::InvalidBitCount(count).into());
        }
        let end = idx.saturating_add(count);
        if end > self.bit_count {
            return Err(BitBufferError::IndexOutOfRange {
                index: end - 1,
                limit: self.bit_count,
            }
            .into());
        }
        Ok((idx..end).fold(0u64, |acc, i| (acc << 1) | self.bit_at(i) as u64))
    }

    /// Overwrite `count` bits starting at `idx` with the low `count` bits of
    /// `value`, most significant first.
    ///
    /// # Errors
    /// - `BitBufferError::InvalidBitCount` if `count > 64`
    /// - `BitBufferError::IndexOutOfRange` if the field extends past capacity
    pub fn set_bits(&mut self, idx: usize, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitBufferError::InvalidBitCount(count).into());
        }
        let limit = self.data.len() * 8;
        let end = idx.saturating_add(count);
        if end > limit {
            return Err(BitBufferError::IndexOutOfRange {
                index: end - 1,
                limit,
            }
            .into());
        }
        for (offset, shift) in (0..count).rev().enumerate() {
            self.put_bit(idx + offset, (value >> shift) & 1 == 1);
        }
        Ok(())
    }

    fn bit_at(&self, idx: usize) -> bool {
        let byte = self.data[idx / 8];
        (byte >> (7 - idx % 8)) & 1 == 1
    }

    fn put_bit(&mut self, idx: usize, value: bool) {
        let mask = 1u8 << (7 - idx % 8);
        let byte = &mut self.data[idx / 8];
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Double the capacity; new bytes are zero.
    fn grow(&mut self) {
        let new_capacity = (self.data.len() * 2).max(self.data.len() + 1);
        self.data.resize(new_capacity, 0);
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_new_is_empty() {
        let buffer = BitBuffer::new();
        assert_eq!(buffer.bit_count(), 0);
        assert_eq!(buffer.capacity(), START_CAPACITY);
        assert!(buffer.is_empty());
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn test_append_single_byte() {
        let mut buffer = BitBuffer::new();
        for &bit in &[true, false, true, true, false, false, true, false] {
            buffer.append_bit(bit);
        }

        assert_eq!(buffer.as_bytes(), &[0b10110010]);
    }

    #[test]
    fn test_padding() {
        let mut buffer = BitBuffer::new();
        buffer.append_bit(true);
        // Should be padded to 10000000

        assert_eq!(buffer.bit_count(), 1);
        assert_eq!(buffer.as_bytes(), &[0b10000000]);
    }

    #[test]
    fn test_get_past_end() {
        let mut buffer = BitBuffer::new();
        buffer.append_bit(true);

        assert!(buffer.get_bit(0).unwrap());
        let err = buffer.get_bit(1).unwrap_err();
        assert!(matches!(
            err,
            Error::BitBuffer(BitBufferError::IndexOutOfRange { index: 1, limit: 1 })
        ));
    }

    #[test]
    fn test_set_bit_preserves_neighbours() {
        let mut buffer = BitBuffer::from_bytes(&[0b1111_0000]);
        buffer.set_bit(2, false).unwrap();
        buffer.set_bit(5, true).unwrap();

        assert_eq!(buffer.as_bytes(), &[0b1101_0100]);
    }

    #[test]
    fn test_set_bit_within_capacity_past_count() {
        let mut buffer = BitBuffer::new();
        buffer.set_bit(31, true).unwrap();
        assert_eq!(buffer.bit_count(), 0);
        assert!(buffer.set_bit(32, true).is_err());
    }

    #[test]
    fn test_growth_preserves_bits() {
        let mut buffer = BitBuffer::new();
        let pattern: Vec<bool> = (0..200).map(|i| i % 3 == 0).collect();
        for &bit in &pattern {
            buffer.append_bit(bit);
        }

        assert!(buffer.capacity() * 8 >= 200);
        assert!(buffer.capacity() > START_CAPACITY);
        for (i, &bit) in pattern.iter().enumerate() {
            assert_eq!(buffer.get_bit(i).unwrap(), bit, "bit {i}");
        }
    }

    #[test]
    fn test_multi_bit_fields() {
        let mut buffer = BitBuffer::new();
        buffer.append_bits(0, 32).unwrap();
        buffer.append_bits(0b101, 3).unwrap();
        buffer.set_bits(0, 0xDEADBEEF, 32).unwrap();

        assert_eq!(buffer.get_bits(0, 32).unwrap(), 0xDEADBEEF);
        assert_eq!(buffer.get_bits(32, 3).unwrap(), 0b101);
        assert_eq!(buffer.as_bytes(), &[0xDE, 0xAD, 0xBE, 0xEF, 0b1010_0000]);
        assert!(buffer.get_bits(33, 3).is_err());
        assert!(buffer.get_bits(0, 65).is_err());
    }

    #[test]
    fn test_load_and_save() {
        let bytes = [0x00u8, 0xFF, 0x5A];
        let buffer = BitBuffer::load(&bytes[..]).unwrap();
        assert_eq!(buffer.bit_count(), 24);
        assert_eq!(buffer.get_bits(16, 8).unwrap(), 0x5A);

        let mut out = Vec::new();
        buffer.save(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_load_empty() {
        let buffer = BitBuffer::load(&[][..]).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), START_CAPACITY);
    }

    #[test]
    fn test_into_bytes_truncates_capacity() {
        let mut buffer = BitBuffer::with_capacity(16);
        buffer.append_bits(0b11, 2).unwrap();
        assert_eq!(buffer.into_bytes(), vec![0b1100_0000]);
    }

    #[quickcheck]
    fn append_then_get_is_bit_exact(bits: Vec<bool>) -> bool {
        let mut buffer = BitBuffer::new();
        for (n, &bit) in bits.iter().enumerate() {
            buffer.append_bit(bit);
            if buffer.bit_count() != n + 1 {
                return false;
            }
        }
        bits.iter()
            .enumerate()
            .all(|(i, &bit)| buffer.get_bit(i).unwrap() == bit)
    }

    #[quickcheck]
    fn save_then_load_keeps_bytes(bytes: Vec<u8>) -> bool {
        let mut out = Vec::new();
        BitBuffer::from_bytes(&bytes).save(&mut out).unwrap();
        let reloaded = BitBuffer::load(&out[..]).unwrap();
        reloaded.as_bytes() == bytes.as_slice() && reloaded.bit_count() == bytes.len() * 8
    }
}
