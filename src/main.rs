use clap::Parser;
use clap::error::ErrorKind;
use crchack::crc::*;
use crchack::search::*;
use crchack::*;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{Level, info};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    ///File whose checksum must survive
    input: PathBuf,

    ///Where to write the extended file, replacing anything already there
    output: PathBuf,

    ///Text to append after the original contents
    #[arg(short, long, default_value = DEFAULT_INJECTION)]
    inject: String,

    ///Number of search threads, defaults to the available parallelism
    #[arg(short, long)]
    threads: Option<NonZeroUsize>,

    ///Log search progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse_from(wild::args()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match run(&args) {
        Ok(checksum) => {
            println!("Wrote '{}' with checksum {checksum:#010x}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<u32> {
    let started = Instant::now();
    let crc = Crc32::new();
    let searcher = args.threads.map_or_else(Searcher::new, Searcher::with_workers);

    let checksum = hack_file(&crc, &searcher, &args.input, &args.output, args.inject.as_bytes())?;

    info!(elapsed = ?started.elapsed(), "done");
    Ok(checksum)
}
