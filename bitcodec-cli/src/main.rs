//! bitcodec CLI
//!
//! Prefix-code compression, Hamming SECDED and CRC codecs for whole files,
//! with an error infuser for exercising the decoders.

mod commands;
mod config;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::crc::parse_polynomial;
use commands::{
    AlgorithmArg, CrcArgs, LayoutArg, cmd_compress, cmd_crc_decode, cmd_crc_encode,
    cmd_decompress, cmd_entropy, cmd_hamming_decode, cmd_hamming_encode, cmd_infuse,
};
use config::CliConfig;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use utils::RunOptions;

#[derive(Parser)]
#[command(name = "bitcodec")]
#[command(
    author,
    version,
    about = "Bit-level codec toolkit - prefix-code compression, Hamming and CRC"
)]
#[command(long_about = "
bitcodec compresses files with Shannon-Fano or Huffman codes and protects
them with Hamming SECDED or CRC block codes.

Examples:
  bitcodec compress notes.txt notes.huff
  bitcodec compress notes.txt notes.sf --algorithm shannon-fano
  bitcodec decompress notes.huff notes.txt
  bitcodec hamming-encode data.bin data.ham -b 256
  bitcodec infuse data.ham data.dirty --layout hamming -b 256 --errors 1 --seed 7
  bitcodec hamming-decode data.dirty data.out -b 256
  bitcodec crc-encode data.bin data.crc --polynomial 0xD175 --width 16
  bitcodec crc-decode data.crc data.out --detect-only
  bitcodec entropy notes.txt --json
  bitcodec completions bash > bitcodec.bash
")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the summary as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Cancel the operation after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    time_limit: Option<f64>,

    /// Hide the progress bar
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file with a prefix code
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Compressed output file
        output: PathBuf,

        /// Code construction algorithm
        #[arg(short, long, value_enum, default_value = "huffman")]
        algorithm: AlgorithmArg,
    },

    /// Decompress a file written by `compress`
    #[command(alias = "d")]
    Decompress {
        /// Compressed file
        input: PathBuf,

        /// Restored output file
        output: PathBuf,
    },

    /// Protect a file with an extended Hamming code
    HammingEncode {
        /// File to encode
        input: PathBuf,

        /// Encoded output file
        output: PathBuf,

        /// Block size in bits (power of two, 4 to 2048)
        #[arg(short, long)]
        block_size: Option<usize>,
    },

    /// Decode a Hamming-encoded file, correcting single-bit errors
    HammingDecode {
        /// Encoded file
        input: PathBuf,

        /// Decoded output file
        output: PathBuf,

        /// Block size used when encoding
        #[arg(short, long)]
        block_size: Option<usize>,
    },

    /// Append a CRC checksum to every block of a file
    CrcEncode {
        /// File to encode
        input: PathBuf,

        /// Encoded output file
        output: PathBuf,

        #[command(flatten)]
        crc: CrcOptions,
    },

    /// Check and strip the CRC checksums of an encoded file
    CrcDecode {
        /// Encoded file
        input: PathBuf,

        /// Decoded output file
        output: PathBuf,

        #[command(flatten)]
        crc: CrcOptions,
    },

    /// Compute the Shannon entropy of a file's bytes
    #[command(alias = "e")]
    Entropy {
        /// File to measure
        input: PathBuf,
    },

    /// Flip random bits in every block of an encoded file
    Infuse {
        /// Encoded file
        input: PathBuf,

        /// Corrupted output file
        output: PathBuf,

        /// Block structure of the input
        #[arg(short, long, value_enum, default_value = "hamming")]
        layout: LayoutArg,

        /// Block size (Hamming block, or CRC data bits)
        #[arg(short, long)]
        block_size: Option<usize>,

        /// Bits flipped per block
        #[arg(short, long, default_value_t = 1)]
        errors: usize,

        /// Seed for reproducible corruption
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct CrcOptions {
    /// Data bits per block
    #[arg(short, long)]
    block_size: Option<usize>,

    /// Generator polynomial (hex, or binary with 0b)
    #[arg(short, long, value_parser = parse_polynomial)]
    polynomial: Option<u64>,

    /// Significant bits of the polynomial
    #[arg(short, long)]
    width: Option<usize>,

    /// Only detect errors, never repair them
    #[arg(long)]
    detect_only: bool,
}

impl From<CrcOptions> for CrcArgs {
    fn from(opts: CrcOptions) -> Self {
        Self {
            block_size: opts.block_size,
            polynomial: opts.polynomial,
            width: opts.width,
            detect_only: opts.detect_only,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let time_limit = match cli.time_limit {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => return Err(format!("invalid time limit: {}", secs).into()),
        None => None,
    };
    let opts = RunOptions {
        progress: !cli.no_progress,
        json: cli.json,
        time_limit,
    };

    match cli.command {
        Commands::Compress {
            input,
            output,
            algorithm,
        } => cmd_compress(&input, &output, algorithm, &config, &opts),
        Commands::Decompress { input, output } => cmd_decompress(&input, &output, &config, &opts),
        Commands::HammingEncode {
            input,
            output,
            block_size,
        } => cmd_hamming_encode(&input, &output, block_size, &config, &opts),
        Commands::HammingDecode {
            input,
            output,
            block_size,
        } => cmd_hamming_decode(&input, &output, block_size, &config, &opts),
        Commands::CrcEncode { input, output, crc } => {
            cmd_crc_encode(&input, &output, crc.into(), &config, &opts)
        }
        Commands::CrcDecode { input, output, crc } => {
            cmd_crc_decode(&input, &output, crc.into(), &config, &opts)
        }
        Commands::Entropy { input } => cmd_entropy(&input, &config, &opts),
        Commands::Infuse {
            input,
            output,
            layout,
            block_size,
            errors,
            seed,
        } => cmd_infuse(
            &input, &output, layout, block_size, errors, seed, &config, &opts,
        ),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "bitcodec", &mut io::stdout());
            Ok(())
        }
    }
}
