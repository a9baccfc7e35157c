//! prefix-transcode: command-line front end for `prefix_transcode_core`
//!
//! Three programs share this library:
//! - `encode <code-file> <infile> <outfile>`
//! - `decode <code-file> <infile> <outfile>`
//! - `gencodes <outfile>` writes a random valid codes file
//!
//! Each exits with status 0 on success and non-zero on any failure.

pub mod config;
pub mod input_gen;
pub mod transcode;
