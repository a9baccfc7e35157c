//! Statistics for a single encode or decode run.
//!
//! Tracks sizes and timing so the command-line programs can report how well
//! a code table fits the data it was used on.
//!
//! # Thread Safety
//!
//! `TranscodeStats` is plain data updated by the single thread running the
//! transcode.

use std::time::{Duration, Instant};

/// Which direction a run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// Sizes and timing for one transcode.
#[derive(Debug, Clone)]
pub struct TranscodeStats {
    pub direction: Direction,

    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Sizes ===
    /// Uncompressed bytes (encoder input, decoder output)
    pub raw_bytes: u64,

    /// Compressed bytes, including header and padding
    pub packed_bytes: u64,

    /// Bits of concatenated codes, excluding header and padding
    pub payload_bits: u64,
}

impl TranscodeStats {
    /// Start timing a run.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            start_time: Instant::now(),
            end_time: None,
            raw_bytes: 0,
            packed_bytes: 0,
            payload_bits: 0,
        }
    }

    /// Record the sizes of a finished run and stop the clock.
    ///
    /// `packed_bits` is the bit count of the compressed buffer; `payload_bits`
    /// counts only the codes, without header or padding.
    pub fn complete(&mut self, raw_bytes: usize, packed_bits: usize, payload_bits: usize) {
        self.raw_bytes = raw_bytes as u64;
        self.packed_bytes = packed_bits.div_ceil(8) as u64;
        self.payload_bits = payload_bits as u64;
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        self.end_time
            .unwrap_or_else(Instant::now)
            .duration_since(self.start_time)
    }

    /// Compressed size over raw size (0.0 for empty input).
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.packed_bytes as f64 / self.raw_bytes as f64
        }
    }

    /// Mean code length actually used, in bits per input byte.
    pub fn bits_per_byte(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.raw_bytes as f64
        }
    }

    /// Compute throughput in raw bytes/second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stderr.
    pub fn print_summary(&self) {
        let title = match self.direction {
            Direction::Encode => "Encode",
            Direction::Decode => "Decode",
        };
        eprintln!("=== {title} Summary ===");
        eprintln!("Duration: {} ms", self.duration().as_millis());
        eprintln!("Raw:      {} bytes", self.raw_bytes);
        eprintln!("Packed:   {} bytes", self.packed_bytes);
        eprintln!("Ratio:    {:.1}%", self.compression_ratio() * 100.0);
        eprintln!("Code length: {:.3} bits/byte", self.bits_per_byte());
        eprintln!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Export stats as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             raw_bytes={}\n\
             packed_bytes={}\n\
             payload_bits={}\n\
             compression_ratio={:.4}\n\
             bits_per_byte={:.4}\n",
            self.duration().as_millis(),
            self.raw_bytes,
            self.packed_bytes,
            self.payload_bits,
            self.compression_ratio(),
            self.bits_per_byte(),
        )
    }
}
