use blk_validator::{BlkValidator, OpResult, KNOWN_LIMITATIONS};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Decode a raw blk file, validate the chain it holds and dump it as JSON
#[derive(Parser)]
#[command(name = "blk-validator")]
#[command(version)]
struct Cli {
    /// Concatenated blocks, each preceded by magic and size
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the JSON document (default: <INPUT>.json)
    #[arg(short, long, value_name = "PATH", conflicts_with = "no_output")]
    output: Option<PathBuf>,

    /// Decode and validate only
    #[arg(long)]
    no_output: bool,

    /// More logging on stderr (-v info, -vv debug); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    // log records reach the subscriber through its tracing-log bridge
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> OpResult<usize> {
    let validator = BlkValidator::new(&cli.input)?;
    if cli.no_output {
        Ok(validator.check()?.len())
    } else {
        validator.run(cli.output.as_deref())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    for limitation in KNOWN_LIMITATIONS.iter() {
        info!("not checked: {}", limitation);
    }

    match run(&cli) {
        Ok(height) => {
            println!("No errors {} blocks", height);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            match e.rule_code() {
                Some((rule, height)) => println!("Error {} Block {}", rule, height),
                None => println!("Error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}
