//! Prefix-code table: the 256-entry mapping from byte value to bit-string.
//!
//! A table is loaded once from the codes file format (256 newline-terminated
//! lines of '0'/'1', line `i` holding the code for byte `i`) and is immutable
//! afterwards. Loading validates that the table is complete and prefix-free,
//! which is what makes greedy bit-by-bit decoding unambiguous.
//!
//! # Structure
//!
//! Besides the forward array (byte -> code), the table keeps a binary trie
//! keyed by bit path. Leaves hold byte values; inner nodes are branches.
//! Insertion fails as soon as a new code runs into an existing leaf (an
//! existing code is a prefix of it) or ends on a branch (it is a prefix of an
//! existing code), so prefix-freedom is enforced structurally and `lookup`
//! costs O(code length).

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use log::debug;

use crate::error::{CodeTableError, ParseCodeError, Result};

/// Number of entries in a complete table, one per byte value.
pub const SYMBOL_COUNT: usize = 256;

/// Maximum length of a single code, in bits.
pub const MAX_CODE_LEN: usize = 24;

/// A bit-string of at most `MAX_CODE_LEN` bits.
///
/// Bits are stored right-aligned in `value`; bit 0 of the code is the most
/// significant of the `len` stored bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Code {
    value: u32,
    len: u8,
}

impl Code {
    /// The empty bit-string.
    pub const EMPTY: Code = Code { value: 0, len: 0 };

    /// Build a code from the low `len` bits of `value`.
    ///
    /// Returns `None` if `len` exceeds `MAX_CODE_LEN` or `value` has bits set
    /// above `len`.
    pub fn new(value: u32, len: usize) -> Option<Self> {
        if len > MAX_CODE_LEN || (value >> len) != 0 {
            return None;
        }
        Some(Self {
            value,
            len: len as u8,
        })
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The code's bits as a right-aligned integer.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Bit `i` of the code, counting from the first (leftmost) bit.
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.len());
        (self.value >> (self.len() - 1 - i)) & 1 == 1
    }

    /// Iterate over the bits in transmission order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(move |i| self.bit(i))
    }

    /// Extend the code by one bit, or `None` if it is already at
    /// `MAX_CODE_LEN`.
    pub fn checked_push(self, bit: bool) -> Option<Self> {
        if self.len() >= MAX_CODE_LEN {
            return None;
        }
        Some(Self {
            value: (self.value << 1) | bit as u32,
            len: self.len + 1,
        })
    }

    /// Whether `self` is a prefix of `other` (equal codes count).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.value >> (other.len - self.len) == self.value
    }
}

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_code(s.as_bytes())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

fn parse_code(text: &[u8]) -> std::result::Result<Code, ParseCodeError> {
    let mut code = Code::EMPTY;
    for &c in text {
        let bit = match c {
            b'0' => false,
            b'1' => true,
            other => return Err(ParseCodeError::InvalidCharacter(other as char)),
        };
        code = code.checked_push(bit).ok_or(ParseCodeError::TooLong {
            max: MAX_CODE_LEN,
        })?;
    }
    if code.is_empty() {
        return Err(ParseCodeError::Empty);
    }
    Ok(code)
}

/// Result of matching a candidate bit-string against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The candidate is exactly the code for this byte
    Symbol(u8),
    /// The candidate is a proper prefix of at least one code
    Prefix,
    /// The candidate neither matches nor prefixes any code
    Invalid,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Branch([Option<u32>; 2]),
    Leaf(u8),
}

/// Binary trie over code bit paths. Node 0 is the root.
#[derive(Debug, Clone)]
struct Trie {
    nodes: Vec<Node>,
}

impl Trie {
    fn new() -> Self {
        Self {
            nodes: vec![Node::Branch([None, None])],
        }
    }

    /// Insert a non-empty code; fails if it collides with a code already present.
    fn insert(&mut self, code: Code, symbol: u8) -> std::result::Result<(), CodeTableError> {
        let mut node = 0;
        for bit in code.bits() {
            let children = match self.nodes[node] {
                // An existing code is a prefix of this one
                Node::Leaf(other) => return Err(CodeTableError::PrefixCollision { symbol, other }),
                Node::Branch(children) => children,
            };
            node = match children[bit as usize] {
                Some(next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::Branch([None, None]));
                    if let Node::Branch(children) = &mut self.nodes[node] {
                        children[bit as usize] = Some(next as u32);
                    }
                    next
                }
            };
        }

        match self.nodes[node] {
            Node::Leaf(other) => Err(CodeTableError::PrefixCollision { symbol, other }),
            Node::Branch([None, None]) => {
                self.nodes[node] = Node::Leaf(symbol);
                Ok(())
            }
            // This code is a prefix of an existing one
            Node::Branch(_) => Err(CodeTableError::PrefixCollision {
                symbol,
                other: self.first_leaf(node).unwrap_or(symbol),
            }),
        }
    }

    fn first_leaf(&self, mut node: usize) -> Option<u8> {
        loop {
            match self.nodes[node] {
                Node::Leaf(symbol) => return Some(symbol),
                Node::Branch(children) => node = children.iter().flatten().next().copied()? as usize,
            }
        }
    }

    fn lookup(&self, candidate: &Code) -> Lookup {
        let mut node = 0;
        for bit in candidate.bits() {
            match self.nodes[node] {
                Node::Leaf(_) => return Lookup::Invalid,
                Node::Branch(children) => match children[bit as usize] {
                    Some(next) => node = next as usize,
                    None => return Lookup::Invalid,
                },
            }
        }
        match self.nodes[node] {
            Node::Leaf(symbol) => Lookup::Symbol(symbol),
            Node::Branch(_) => Lookup::Prefix,
        }
    }
}

/// Accumulates codes in byte order and validates each on arrival.
struct Builder {
    codes: Vec<Code>,
    trie: Trie,
}

impl Builder {
    fn new() -> Self {
        Self {
            codes: Vec::with_capacity(SYMBOL_COUNT),
            trie: Trie::new(),
        }
    }

    /// 1-based line number of the next code.
    fn line(&self) -> usize {
        self.codes.len() + 1
    }

    fn push(&mut self, code: Code) -> std::result::Result<(), CodeTableError> {
        if self.codes.len() == SYMBOL_COUNT {
            return Err(CodeTableError::TooManyCodes { max: SYMBOL_COUNT });
        }
        if code.is_empty() {
            return Err(CodeTableError::EmptyCode { line: self.line() });
        }
        self.trie.insert(code, self.codes.len() as u8)?;
        self.codes.push(code);
        Ok(())
    }

    fn finish(self) -> std::result::Result<CodeTable, CodeTableError> {
        let found = self.codes.len();
        let codes: [Code; SYMBOL_COUNT] =
            self.codes
                .try_into()
                .map_err(|_| CodeTableError::WrongCount {
                    expected: SYMBOL_COUNT,
                    found,
                })?;
        Ok(CodeTable {
            codes,
            trie: self.trie,
        })
    }
}

/// A complete, validated, prefix-free code table.
///
/// # Invariants
/// - exactly 256 codes, each 1..=24 bits
/// - no code is a prefix of another
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Code; SYMBOL_COUNT],
    trie: Trie,
}

impl CodeTable {
    /// Build a table from codes given in byte order.
    ///
    /// # Errors
    /// Any `CodeTableError` describing the first violation found.
    pub fn from_codes<I>(codes: I) -> std::result::Result<Self, CodeTableError>
    where
        I: IntoIterator<Item = Code>,
    {
        let mut builder = Builder::new();
        for code in codes {
            builder.push(code)?;
        }
        builder.finish()
    }

    /// Parse the codes file format.
    ///
    /// # Errors
    /// - `InvalidCharacter` for anything other than '0', '1' and newline
    /// - `TooManyCodes` if a 257th line starts
    /// - `CodeTooLong`, `EmptyCode`, `UnterminatedLine` for a bad line
    /// - `PrefixCollision` if a code is a prefix of an earlier one or vice versa
    /// - `WrongCount` if fewer than 256 lines are present
    pub fn parse(text: &[u8]) -> std::result::Result<Self, CodeTableError> {
        let mut builder = Builder::new();
        for raw in text.split_inclusive(|&c| c == b'\n') {
            let line = builder.line();
            if line > SYMBOL_COUNT {
                return Err(CodeTableError::TooManyCodes { max: SYMBOL_COUNT });
            }
            let (body, terminated) = match raw.strip_suffix(b"\n") {
                Some(body) => (body, true),
                None => (raw, false),
            };
            let code = parse_code(body).map_err(|err| match err {
                ParseCodeError::Empty => CodeTableError::EmptyCode { line },
                ParseCodeError::TooLong { max } => CodeTableError::CodeTooLong { line, max },
                ParseCodeError::InvalidCharacter(found) => {
                    CodeTableError::InvalidCharacter { line, found }
                }
            })?;
            if !terminated {
                return Err(CodeTableError::UnterminatedLine { line });
            }
            builder.push(code)?;
        }
        let table = builder.finish()?;
        debug!(
            "loaded code table: {} codes, {} trie nodes, longest code {} bits",
            SYMBOL_COUNT,
            table.trie.nodes.len(),
            table.max_code_len()
        );
        Ok(table)
    }

    /// Read and parse a codes file from `source`.
    pub fn load<R: Read>(mut source: R) -> Result<Self> {
        let mut text = Vec::new();
        source.read_to_end(&mut text)?;
        Ok(Self::parse(&text)?)
    }

    /// The code for `byte`.
    pub fn code(&self, byte: u8) -> Code {
        self.codes[byte as usize]
    }

    /// All codes, in byte order.
    pub fn codes(&self) -> &[Code; SYMBOL_COUNT] {
        &self.codes
    }

    /// Match a candidate bit-string against every code.
    ///
    /// The empty candidate is a prefix of every code.
    pub fn lookup(&self, candidate: &Code) -> Lookup {
        self.trie.lookup(candidate)
    }

    /// Length of the longest code, in bits.
    pub fn max_code_len(&self) -> usize {
        self.codes.iter().map(Code::len).max().unwrap_or(0)
    }

    /// Number of payload bits `input` encodes to, excluding header and padding.
    pub fn encoded_len(&self, input: &[u8]) -> usize {
        input.iter().map(|&b| self.codes[b as usize].len()).sum()
    }

    /// Write the table in the codes file format.
    pub fn write_to<W: Write>(&self, mut sink: W) -> Result<()> {
        write!(sink, "{self}")?;
        sink.flush()?;
        Ok(())
    }
}

impl FromStr for CodeTable {
    type Err = CodeTableError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.codes {
            writeln!(f, "{code}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every byte coded as its own 8-bit value.
    fn fixed_width_text() -> String {
        (0..SYMBOL_COUNT).map(|b| format!("{b:08b}\n")).collect()
    }

    /// 'A' -> 00, 'B' -> 01, everything else 9 bits under 10 or 11.
    fn ab_codes() -> Vec<Code> {
        let mut suffix = 0u32;
        (0..SYMBOL_COUNT)
            .map(|b| match b as u8 {
                b'A' => Code::new(0b00, 2).unwrap(),
                b'B' => Code::new(0b01, 2).unwrap(),
                _ => {
                    let code = Code::new(0b1_0000_0000 | suffix, 9).unwrap();
                    suffix += 1;
                    code
                }
            })
            .collect()
    }

    #[test]
    fn test_code_parse_and_display() {
        let code: Code = "0110".parse().unwrap();
        assert_eq!(code.len(), 4);
        assert_eq!(code.value(), 0b0110);
        assert_eq!(code.to_string(), "0110");
        assert_eq!(code.bits().collect::<Vec<_>>(), vec![false, true, true, false]);

        assert_eq!("".parse::<Code>(), Err(ParseCodeError::Empty));
        assert_eq!("012".parse::<Code>(), Err(ParseCodeError::InvalidCharacter('2')));
        assert_eq!(
            "1".repeat(25).parse::<Code>(),
            Err(ParseCodeError::TooLong { max: MAX_CODE_LEN })
        );
        assert!("1".repeat(24).parse::<Code>().is_ok());
    }

    #[test]
    fn test_code_new_rejects_stray_bits() {
        assert!(Code::new(0b100, 2).is_none());
        assert!(Code::new(0, 25).is_none());
        assert_eq!(Code::new(0b11, 2).unwrap().to_string(), "11");
    }

    #[test]
    fn test_prefix_of() {
        let short: Code = "01".parse().unwrap();
        let long: Code = "0110".parse().unwrap();
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        assert!(short.is_prefix_of(&short));
        assert!(!"11".parse::<Code>().unwrap().is_prefix_of(&long));
    }

    #[test]
    fn test_parse_fixed_width() {
        let table: CodeTable = fixed_width_text().parse().unwrap();
        assert_eq!(table.code(b'A').to_string(), "01000001");
        assert_eq!(table.max_code_len(), 8);
        assert_eq!(table.to_string(), fixed_width_text());
    }

    #[test]
    fn test_lookup_outcomes() {
        let table = CodeTable::from_codes(ab_codes()).unwrap();

        assert_eq!(table.lookup(&"00".parse().unwrap()), Lookup::Symbol(b'A'));
        assert_eq!(table.lookup(&"01".parse().unwrap()), Lookup::Symbol(b'B'));
        assert_eq!(table.lookup(&"0".parse().unwrap()), Lookup::Prefix);
        assert_eq!(table.lookup(&"1".parse().unwrap()), Lookup::Prefix);
        assert_eq!(table.lookup(&"10000".parse().unwrap()), Lookup::Prefix);
        assert_eq!(table.lookup(&"000".parse().unwrap()), Lookup::Invalid);
        assert_eq!(table.lookup(&Code::EMPTY), Lookup::Prefix);

        // 126 codes under "11": 11 + 1111110 is the first unused one
        assert_eq!(table.lookup(&"111111110".parse().unwrap()), Lookup::Invalid);
    }

    #[test]
    fn test_encoded_len() {
        let table = CodeTable::from_codes(ab_codes()).unwrap();
        assert_eq!(table.encoded_len(b"ABBA"), 8);
        assert_eq!(table.encoded_len(b"AC"), 11);
        assert_eq!(table.encoded_len(b""), 0);
    }

    #[test]
    fn test_lookup_every_code() {
        let table = CodeTable::from_codes(ab_codes()).unwrap();
        for byte in 0..=255u8 {
            assert_eq!(table.lookup(&table.code(byte)), Lookup::Symbol(byte));
        }
    }

    #[test]
    fn test_reject_prefix_of_earlier() {
        let mut text = fixed_width_text();
        // line 2 (byte 1) becomes "0000000", a prefix of byte 0's code
        text.replace_range(9..18, "0000000\n");
        let err = text.parse::<CodeTable>().unwrap_err();
        assert_eq!(err, CodeTableError::PrefixCollision { symbol: 1, other: 0 });
    }

    #[test]
    fn test_reject_prefixed_by_earlier() {
        let mut codes = ab_codes();
        codes[200] = "000".parse().unwrap();
        let err = CodeTable::from_codes(codes).unwrap_err();
        assert_eq!(
            err,
            CodeTableError::PrefixCollision {
                symbol: 200,
                other: b'A'
            }
        );
    }

    #[test]
    fn test_reject_duplicate() {
        let mut codes = ab_codes();
        codes[255] = codes[0];
        assert_eq!(
            CodeTable::from_codes(codes).unwrap_err(),
            CodeTableError::PrefixCollision { symbol: 255, other: 0 }
        );
    }

    #[test]
    fn test_reject_wrong_count() {
        let text = fixed_width_text();
        let short: String = text.lines().take(255).map(|l| format!("{l}\n")).collect();
        assert_eq!(
            short.parse::<CodeTable>().unwrap_err(),
            CodeTableError::WrongCount {
                expected: 256,
                found: 255
            }
        );

        let long = format!("{text}111111111\n");
        assert_eq!(
            long.parse::<CodeTable>().unwrap_err(),
            CodeTableError::TooManyCodes { max: 256 }
        );
    }

    #[test]
    fn test_reject_too_long() {
        let mut lines: Vec<String> = fixed_width_text().lines().map(String::from).collect();
        lines[3] = "1".repeat(25);
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        assert_eq!(
            text.parse::<CodeTable>().unwrap_err(),
            CodeTableError::CodeTooLong { line: 4, max: 24 }
        );
    }

    #[test]
    fn test_reject_bad_character() {
        let text = fixed_width_text().replacen("00000010", "0000001x", 1);
        assert_eq!(
            text.parse::<CodeTable>().unwrap_err(),
            CodeTableError::InvalidCharacter { line: 3, found: 'x' }
        );

        let crlf = fixed_width_text().replace('\n', "\r\n");
        assert!(matches!(
            crlf.parse::<CodeTable>().unwrap_err(),
            CodeTableError::InvalidCharacter { line: 1, found: '\r' }
        ));
    }

    #[test]
    fn test_reject_blank_and_unterminated() {
        let blank = fixed_width_text().replacen("00000101\n", "\n", 1);
        assert_eq!(
            blank.parse::<CodeTable>().unwrap_err(),
            CodeTableError::EmptyCode { line: 6 }
        );

        let mut unterminated = fixed_width_text();
        unterminated.pop();
        assert_eq!(
            unterminated.parse::<CodeTable>().unwrap_err(),
            CodeTableError::UnterminatedLine { line: 256 }
        );
    }

    #[test]
    fn test_load_round_trips_through_writer() {
        let table = CodeTable::from_codes(ab_codes()).unwrap();
        let mut text = Vec::new();
        table.write_to(&mut text).unwrap();

        let reloaded = CodeTable::load(&text[..]).unwrap();
        assert_eq!(reloaded.codes(), table.codes());
    }
}
