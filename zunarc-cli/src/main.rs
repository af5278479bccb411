//! ZunArc CLI
//!
//! Lists, tests and extracts ZDAT containers, and decodes the raw LZSS
//! streams and cipher layers used by ZUN's games.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    DecryptOptions, ExtractOptions, ListOptions, cmd_decrypt, cmd_extract, cmd_info, cmd_list,
    cmd_test, cmd_unlzss,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use utils::{parse_u8, parse_u32};

#[derive(Parser)]
#[command(name = "zunarc")]
#[command(author, version, about = "ZUN data decoder - ZDAT containers and LZSS streams")]
#[command(long_about = "
ZunArc decodes the LZSS-compressed, lightly encrypted data files used by
ZUN's games.

Examples:
  zunarc list th08.dat -v
  zunarc extract th08.dat -o out
  zunarc extract th08.dat -I '*.ecl'
  zunarc test th08.dat
  zunarc info th08.dat
  zunarc unlzss entry.lzss --size 4096 -o entry.bin
  zunarc decrypt th06.msg --key 0x77 -o th06.dec
  zunarc decrypt th08.msg --block 0x400 --base 0x1b --add 0x37 -o th08.dec
")]
struct Cli {
    /// Log more detail to stderr (-d debug, -dd trace). RUST_LOG overrides.
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show sizes, ciphers and checksums
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only entries matching pattern (glob syntax: *.ecl)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Extract entries from an archive
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Entries to extract (all if empty)
        files: Vec<String>,

        /// Include only entries matching pattern (glob syntax: *.ecl)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,

        /// Write entries whose checksum does not match
        #[arg(long)]
        keep_corrupt: bool,
    },

    /// Test archive integrity
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about an archive
    #[command(alias = "i")]
    Info {
        /// Archive file
        archive: PathBuf,
    },

    /// Decompress a bare ZUN LZSS stream
    Unlzss {
        /// Compressed input file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exact decompressed size; without it decoding stops at the end marker
        #[arg(short, long, value_parser = parse_size)]
        size: Option<usize>,
    },

    /// Remove the additive or block cipher from a file
    Decrypt {
        /// Encrypted input file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Additive cipher key (TH06)
        #[arg(short, long, value_parser = parse_u8, conflicts_with = "block")]
        key: Option<u8>,

        /// Block cipher block size (TH08+)
        #[arg(long, value_parser = parse_u32, requires_all = ["base", "add"])]
        block: Option<u32>,

        /// Block cipher starting key
        #[arg(long, value_parser = parse_u8, requires = "block")]
        base: Option<u8>,

        /// Block cipher key increment
        #[arg(long, value_parser = parse_u8, requires = "block")]
        add: Option<u8>,
    },
}

fn parse_size(s: &str) -> Result<usize, String> {
    parse_u32(s).map(|v| v as usize)
}

/// Install the stderr log subscriber.
fn init_logging(debug: u8) {
    let default_level = match debug {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Commands::List {
            archive,
            verbose,
            json,
            include,
            exclude,
        } => cmd_list(
            &archive,
            &ListOptions {
                verbose,
                json,
                include: &include,
                exclude: &exclude,
            },
        ),
        Commands::Extract {
            archive,
            output,
            files,
            include,
            exclude,
            verbose,
            no_progress,
            keep_corrupt,
        } => cmd_extract(
            &archive,
            &ExtractOptions {
                output: &output,
                files: &files,
                include: &include,
                exclude: &exclude,
                verbose,
                progress: !no_progress,
                keep_corrupt,
            },
        ),
        Commands::Test { archive, verbose } => cmd_test(&archive, verbose),
        Commands::Info { archive } => cmd_info(&archive),
        Commands::Unlzss {
            input,
            output,
            size,
        } => cmd_unlzss(&input, output.as_deref(), size),
        Commands::Decrypt {
            input,
            output,
            key,
            block,
            base,
            add,
        } => cmd_decrypt(
            &input,
            output.as_deref(),
            &DecryptOptions {
                key,
                block,
                base,
                add,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
