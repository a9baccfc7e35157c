//! Length-prefixed bit buffer -> byte stream.
//!
//! Decoding is greedy: bits are appended one at a time to a candidate
//! bit-string which is matched against the table after every bit. Because
//! the table is prefix-free, the first exact match is the only possible one.
//!
//! # States
//!
//! ```text
//!                 Prefix
//!               +--------+
//!               v        |
//!   start --> Accumulating --Symbol--> (emit, reset) --+
//!               |   ^                                 |
//!               |   +---------------------------------+
//!               |
//!               +-- count reached -----------> Done
//!               +-- Invalid / out of bits ---> Failed
//! ```
//!
//! Decoding stops on the byte count in the header, never on the padding.

use log::{debug, trace};

use crate::bitbuffer::BitBuffer;
use crate::code_table::{Code, CodeTable, Lookup};
use crate::encoder::LENGTH_FIELD_BITS;
use crate::error::{DecodeError, Result};

/// Decoder state.
#[derive(Debug)]
enum State {
    /// Building a candidate bit-string
    Accumulating,
    /// Every expected byte has been emitted
    Done,
    /// Malformed or truncated input
    Failed(DecodeError),
}

/// Decodes bit buffers with a borrowed code table.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'t> {
    table: &'t CodeTable,
}

impl<'t> Decoder<'t> {
    pub fn new(table: &'t CodeTable) -> Self {
        Self { table }
    }

    /// Decode a complete buffer.
    ///
    /// Nothing is returned unless all `N` bytes named by the header decode
    /// cleanly.
    ///
    /// # Errors
    /// - `DecodeError::MissingLengthField` if the buffer holds fewer than 32 bits
    /// - `DecodeError::InvalidCode` if bits match no code
    /// - `DecodeError::Truncated` if bits run out before `N` bytes are decoded
    pub fn decode(&self, buffer: &BitBuffer) -> Result<Vec<u8>> {
        let total = buffer.bit_count();
        if total < LENGTH_FIELD_BITS {
            return Err(DecodeError::MissingLengthField {
                bits: total,
                required: LENGTH_FIELD_BITS,
            }
            .into());
        }

        let expected = buffer.get_bits(0, LENGTH_FIELD_BITS)? as u32;
        // Every code is at least one bit, so the payload bounds the output
        let mut output = Vec::with_capacity((expected as usize).min(total - LENGTH_FIELD_BITS));
        let mut decoded: u32 = 0;

        let mut candidate = Code::EMPTY;
        let mut code_start = LENGTH_FIELD_BITS;
        let mut position = LENGTH_FIELD_BITS;
        let mut state = State::Accumulating;

        loop {
            state = match state {
                State::Accumulating if decoded == expected => State::Done,
                State::Accumulating if position >= total => {
                    State::Failed(DecodeError::Truncated { expected, decoded })
                }
                State::Accumulating => {
                    let bit = buffer.get_bit(position)?;
                    position += 1;
                    match candidate.checked_push(bit).map(|c| (c, self.table.lookup(&c))) {
                        Some((code, Lookup::Symbol(byte))) => {
                            trace!("bits {code_start}..{position}: {code} -> {byte:#04x}");
                            output.push(byte);
                            decoded += 1;
                            candidate = Code::EMPTY;
                            code_start = position;
                            State::Accumulating
                        }
                        Some((code, Lookup::Prefix)) => {
                            candidate = code;
                            State::Accumulating
                        }
                        Some((_, Lookup::Invalid)) | None => {
                            State::Failed(DecodeError::InvalidCode {
                                position: code_start,
                            })
                        }
                    }
                }
                State::Done => {
                    debug!(
                        "decoded {} bytes from {} of {} bits",
                        decoded, position, total
                    );
                    return Ok(output);
                }
                State::Failed(err) => {
                    debug!("decode failed after {decoded} of {expected} bytes: {err}");
                    return Err(err.into());
                }
            };
        }
    }

    /// Decode the persisted bytes of a compressed stream.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decode(&BitBuffer::from_bytes(data))
    }
}
