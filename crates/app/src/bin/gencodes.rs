use std::process::ExitCode;

use clap::Parser;
use log::info;
use prefix_transcode::config::{init_logging, GenCodesArgs};
use prefix_transcode::input_gen::generate_code_table;
use prefix_transcode::transcode::write_code_table;

fn main() -> ExitCode {
    let args = GenCodesArgs::parse();
    init_logging(args.verbose);

    let seed = args.seed_or_now();
    if args.seed.is_none() {
        // Printed so the table can be regenerated
        eprintln!("seed: {seed}");
    }
    info!("generating codes file {} (seed {seed}, max length {})", args.outfile.display(), args.max_len);

    let result = generate_code_table(seed, args.max_len as usize)
        .map_err(anyhow::Error::from)
        .and_then(|table| write_code_table(&table, &args.outfile));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
