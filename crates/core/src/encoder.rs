//! Byte stream -> length-prefixed bit buffer.
//!
//! # Stream Format
//!
//! ```text
//! +----------------------+
//! | byte count (32 bits) |  big-endian, MSB first
//! +----------------------+
//! | code(b0) code(b1) .. |  concatenated codes, no separators
//! +----------------------+
//! | padding (0-7 bits)   |  zeros up to the next byte boundary
//! +----------------------+
//! ```

use std::io::Read;

use log::debug;

use crate::bitbuffer::BitBuffer;
use crate::code_table::CodeTable;
use crate::error::{EncodeError, Result};

/// Width of the byte-count header, in bits.
pub const LENGTH_FIELD_BITS: usize = 32;

/// Encodes bytes with a borrowed code table.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'t> {
    table: &'t CodeTable,
}

impl<'t> Encoder<'t> {
    pub fn new(table: &'t CodeTable) -> Self {
        Self { table }
    }

    /// Encode `input` into a new bit buffer.
    ///
    /// # Errors
    /// `EncodeError::InputTooLarge` if `input` has more than `u32::MAX` bytes.
    pub fn encode(&self, input: &[u8]) -> Result<BitBuffer> {
        let mut buffer = BitBuffer::new();

        // Placeholder, patched once the byte count is known
        buffer.append_bits(0, LENGTH_FIELD_BITS)?;

        let mut count: u64 = 0;
        for &byte in input {
            for bit in self.table.code(byte).bits() {
                buffer.append_bit(bit);
            }
            count += 1;
        }

        let count = u32::try_from(count).map_err(|_| EncodeError::InputTooLarge { len: count })?;
        buffer.set_bits(0, count as u64, LENGTH_FIELD_BITS)?;

        debug!(
            "encoded {} bytes into {} bits ({} payload)",
            count,
            buffer.bit_count(),
            buffer.bit_count() - LENGTH_FIELD_BITS
        );
        Ok(buffer)
    }

    /// Read all of `source` and encode it.
    pub fn encode_reader<R: Read>(&self, mut source: R) -> Result<BitBuffer> {
        let mut input = Vec::new();
        source.read_to_end(&mut input)?;
        self.encode(&input)
    }
}
