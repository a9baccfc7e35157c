//! File-level encode/decode driving the core library.
//!
//! Error messages name the offending file:
//! - `<file>: <os error>` when a file cannot be read or written
//! - `Invalid code file: <file>` when the codes file fails validation
//! - `Invalid input file: <file>` when compressed input cannot be decoded
//!
//! # Partial Output
//!
//! A decode runs entirely in memory; the output file is only created once
//! every byte has decoded. If writing the output fails part way, the partial
//! file is removed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use prefix_transcode_core::metrics::{Direction, TranscodeStats};
use prefix_transcode_core::{BitBuffer, CodeTable, Decoder, Encoder, LENGTH_FIELD_BITS};

/// Load and validate the codes file at `path`.
pub fn load_code_table(path: &Path) -> Result<CodeTable> {
    let text = fs::read(path).with_context(|| path.display().to_string())?;
    CodeTable::parse(&text).with_context(|| format!("Invalid code file: {}", path.display()))
}

/// Encode `infile` into `outfile` with the table in `code_file`.
pub fn encode_file(code_file: &Path, infile: &Path, outfile: &Path) -> Result<TranscodeStats> {
    let table = load_code_table(code_file)?;
    let mut stats = TranscodeStats::new(Direction::Encode);

    let input = File::open(infile).with_context(|| infile.display().to_string())?;
    let buffer = Encoder::new(&table)
        .encode_reader(input)
        .with_context(|| format!("Cannot encode input file: {}", infile.display()))?;

    write_output(outfile, |sink| Ok(buffer.save(sink)?))?;

    let raw_bytes = buffer.get_bits(0, LENGTH_FIELD_BITS)? as usize;
    stats.complete(
        raw_bytes,
        buffer.bit_count(),
        buffer.bit_count() - LENGTH_FIELD_BITS,
    );
    info!(
        "encoded {} -> {}: {} bytes into {} bytes",
        infile.display(),
        outfile.display(),
        stats.raw_bytes,
        stats.packed_bytes
    );
    Ok(stats)
}

/// Decode `infile` into `outfile` with the table in `code_file`.
///
/// `outfile` is left untouched if decoding fails.
pub fn decode_file(code_file: &Path, infile: &Path, outfile: &Path) -> Result<TranscodeStats> {
    let table = load_code_table(code_file)?;
    let mut stats = TranscodeStats::new(Direction::Decode);

    let input = File::open(infile).with_context(|| infile.display().to_string())?;
    let buffer = BitBuffer::load(input).with_context(|| infile.display().to_string())?;
    let output = Decoder::new(&table)
        .decode(&buffer)
        .with_context(|| format!("Invalid input file: {}", infile.display()))?;

    write_output(outfile, |sink| Ok(sink.write_all(&output)?))?;

    stats.complete(output.len(), buffer.bit_count(), table.encoded_len(&output));
    info!(
        "decoded {} -> {}: {} bytes into {} bytes",
        infile.display(),
        outfile.display(),
        stats.packed_bytes,
        stats.raw_bytes
    );
    Ok(stats)
}

/// Write a codes file for `table` to `path`.
pub fn write_code_table(table: &CodeTable, path: &Path) -> Result<()> {
    write_output(path, |sink| Ok(table.write_to(sink)?))
}

/// Create `path`, run `write` against it, and remove the file if anything
/// fails after creation.
fn write_output<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path).with_context(|| path.display().to_string())?;
    let mut sink = BufWriter::new(file);
    let result = write(&mut sink).and_then(|()| Ok(sink.flush()?));
    drop(sink);

    if let Err(err) = result {
        warn!("removing partial output {}", path.display());
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("could not remove {}: {remove_err}", path.display());
        }
        return Err(err.context(path.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "prefix-transcode-unit-{}-{name}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_write_output_removes_partial_file() {
        let dir = scratch_dir("partial");
        let path = dir.join("out.bin");

        let result = write_output(&path, |sink| {
            sink.write_all(b"partial")?;
            anyhow::bail!("simulated failure")
        });

        assert!(result.is_err());
        assert!(!path.exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_code_file_names_path() {
        let dir = scratch_dir("missing");
        let path = dir.join("nope.txt");

        let err = load_code_table(&path).unwrap_err();
        assert!(format!("{err:#}").starts_with(&path.display().to_string()));
        fs::remove_dir_all(dir).unwrap();
    }
}
