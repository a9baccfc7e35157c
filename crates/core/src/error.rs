//! Error types for the transcoder.
//!
//! All operations return structured errors rather than panicking.
//! The command-line programs turn these into a message naming the
//! offending file and a non-zero exit status.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit buffer: out-of-range bit access
/// - Code table: a codes file that fails validation
/// - Encode: input that cannot be represented by the length field
/// - Decode: malformed or truncated compressed input
/// - I/O: reading or writing the underlying byte source/sink
#[derive(Debug, Error)]
pub enum Error {
    /// Bit buffer access outside its valid range
    #[error("bit buffer error: {0}")]
    BitBuffer(#[from] BitBufferError),

    /// The code table could not be loaded
    #[error("invalid code table: {0}")]
    CodeTable(#[from] CodeTableError),

    /// Input could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Compressed input could not be decoded
    #[error("invalid compressed input: {0}")]
    Decode(#[from] DecodeError),

    /// I/O error from a byte source or sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bit buffer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitBufferError {
    /// Read or write at an index the buffer does not cover
    #[error("bit index {index} out of range (limit {limit})")]
    IndexOutOfRange { index: usize, limit: usize },

    /// Invalid bit count for a multi-bit field (more than 64 bits)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Code table validation errors.
///
/// Line numbers are 1-based and correspond to the byte value `line - 1`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeTableError {
    /// A character other than '0', '1' or newline
    #[error("line {line}: invalid character {found:?}")]
    InvalidCharacter { line: usize, found: char },

    /// More than 256 codes
    #[error("more than {max} codes")]
    TooManyCodes { max: usize },

    /// A code longer than the 24-bit maximum
    #[error("line {line}: code has more than {max} bits")]
    CodeTooLong { line: usize, max: usize },

    /// A blank line
    #[error("line {line}: empty code")]
    EmptyCode { line: usize },

    /// Final line is missing its newline
    #[error("line {line}: missing trailing newline")]
    UnterminatedLine { line: usize },

    /// Two codes where one is a prefix of (or equal to) the other
    #[error("code for byte {symbol} collides with code for byte {other}")]
    PrefixCollision { symbol: u8, other: u8 },

    /// Fewer than 256 codes
    #[error("expected {expected} codes, found {found}")]
    WrongCount { expected: usize, found: usize },
}

/// Errors parsing a single code from its '0'/'1' text form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCodeError {
    #[error("empty code")]
    Empty,

    #[error("code has more than {max} bits")]
    TooLong { max: usize },

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Encoder errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Input length does not fit in the 32-bit length field
    #[error("input of {len} bytes exceeds the 32-bit length field")]
    InputTooLarge { len: u64 },
}

/// Decoder errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input is too short to hold the length field
    #[error("input has {bits} bits, need at least {required} for the length field")]
    MissingLengthField { bits: usize, required: usize },

    /// Bits that match no code, nor the prefix of one
    #[error("invalid code at bit position {position}")]
    InvalidCode { position: usize },

    /// Bitstream ended before every byte was decoded
    #[error("truncated input: expected {expected} bytes, decoded {decoded}")]
    Truncated { expected: u32, decoded: u32 },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
