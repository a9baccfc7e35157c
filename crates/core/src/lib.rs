//! prefix-transcode-core: byte <-> bit transcoding with a supplied prefix-code table
//!
//! This library provides the pieces behind the `encode` and `decode` programs:
//! - A growable, bit-addressable buffer
//! - A validated 256-entry prefix-code table with streaming match
//! - An encoder that writes a 32-bit byte count followed by packed codes
//! - A decoder that greedily matches codes until the byte count is reached
//!
//! # Architecture
//!
//! - `bitbuffer`: bit-level storage with MSB-first addressing
//! - `code_table`: codes file parsing, validation and lookup
//! - `encoder` / `decoder`: the two transcode directions
//! - `metrics`: sizes and timing of a run
//!
//! Code tables are plain values. Encoders and decoders borrow one, so a table
//! can serve any number of runs and is never mutated after loading.
//!
//! # Example
//! ```
//! use prefix_transcode_core::{compress, decompress, CodeTable};
//!
//! let text: String = (0..256).map(|b| format!("{b:08b}\n")).collect();
//! let table: CodeTable = text.parse().unwrap();
//!
//! let packed = compress(&table, b"hello").unwrap();
//! assert_eq!(&packed[..4], &[0, 0, 0, 5]);
//! assert_eq!(decompress(&table, &packed).unwrap(), b"hello");
//! ```

pub mod bitbuffer;
pub mod code_table;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod metrics;

// Re-export commonly used types
pub use bitbuffer::BitBuffer;
pub use code_table::{Code, CodeTable, Lookup, MAX_CODE_LEN, SYMBOL_COUNT};
pub use decoder::Decoder;
pub use encoder::{Encoder, LENGTH_FIELD_BITS};
pub use error::{Error, Result};

/// Encode `input` and return the persisted bytes of the compressed stream.
pub fn compress(table: &CodeTable, input: &[u8]) -> Result<Vec<u8>> {
    Ok(Encoder::new(table).encode(input)?.into_bytes())
}

/// Decode the persisted bytes of a compressed stream.
pub fn decompress(table: &CodeTable, data: &[u8]) -> Result<Vec<u8>> {
    Decoder::new(table).decode_bytes(data)
}
