//! Seeded generation of code tables and sample input.
//!
//! # Code Tables
//!
//! A table is grown as a random binary tree: starting from the empty code,
//! a randomly chosen leaf shorter than the length limit is split in two
//! until there are 256 leaves. The leaves are then shuffled across byte
//! values. The result is complete (every bit pattern decodes) and
//! prefix-free by construction. No frequencies are involved.
//!
//! # Sample Data
//!
//! Generated data mixes runs, text-like bytes, repeating patterns and
//! random bytes so that different tables produce visibly different sizes.

use log::debug;
use prefix_transcode_core::error::CodeTableError;
use prefix_transcode_core::{Code, CodeTable, MAX_CODE_LEN, SYMBOL_COUNT};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate a random complete prefix-free table with codes of at most
/// `max_len` bits.
///
/// `max_len` is clamped to 8..=24; 8 is the shortest limit that can fit
/// 256 codes. The table goes through the same validation as a loaded one.
pub fn generate_code_table(seed: u64, max_len: usize) -> Result<CodeTable, CodeTableError> {
    let max_len = max_len.clamp(8, MAX_CODE_LEN);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut leaves = vec![Code::EMPTY];

    // While fewer than 256 leaves exist, some leaf is shorter than 8 bits,
    // so a splittable leaf is always available.
    while leaves.len() < SYMBOL_COUNT {
        let splittable: Vec<usize> = leaves
            .iter()
            .enumerate()
            .filter(|(_, code)| code.len() < max_len)
            .map(|(i, _)| i)
            .collect();
        let Some(&index) = splittable.choose(&mut rng) else {
            break;
        };
        let parent = leaves.swap_remove(index);
        leaves.extend(
            [false, true]
                .into_iter()
                .filter_map(|bit| parent.checked_push(bit)),
        );
    }

    leaves.shuffle(&mut rng);
    debug!(
        "generated code table: seed {seed}, lengths {}..={}",
        leaves.iter().map(Code::len).min().unwrap_or(0),
        leaves.iter().map(Code::len).max().unwrap_or(0)
    );

    CodeTable::from_codes(leaves)
}

/// Generate a sample input with mixed compressibility.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `size_bytes`: exact size of generated data
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    // Generate data in chunks with different compressibility
    let mut remaining = size_bytes;

    while remaining > 0 {
        let chunk_size = remaining.min(4096);

        match rng.gen_range(0..10u8) {
            // 30% runs of one byte
            0..=2 => {
                let byte_value: u8 = rng.gen();
                data.extend(std::iter::repeat(byte_value).take(chunk_size));
            }

            // 30% limited alphabet, text-like
            3..=5 => {
                let alphabet = b"abcdefghijklmnopqrstuvwxyz .!,\n";
                for _ in 0..chunk_size {
                    data.push(alphabet[rng.gen_range(0..alphabet.len())]);
                }
            }

            // 20% repeating patterns
            6..=7 => {
                let pattern_len = rng.gen_range(4..=32);
                let pattern: Vec<u8> = (0..pattern_len).map(|_| rng.gen()).collect();
                data.extend(pattern.iter().cycle().take(chunk_size));
            }

            // 20% random bytes
            _ => {
                for _ in 0..chunk_size {
                    data.push(rng.gen());
                }
            }
        }

        remaining -= chunk_size;
    }

    data
}
