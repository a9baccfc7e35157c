use std::process::ExitCode;

use clap::Parser;
use prefix_transcode::config::{init_logging, TranscodeArgs};
use prefix_transcode::transcode::encode_file;

fn main() -> ExitCode {
    let args = TranscodeArgs::parse();
    init_logging(args.verbose);

    match encode_file(&args.code_file, &args.infile, &args.outfile) {
        Ok(stats) => {
            if args.stats {
                stats.print_summary();
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
