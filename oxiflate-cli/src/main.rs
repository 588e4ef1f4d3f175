//! oxiflate CLI - zlib/gzip compression in pure Rust.

mod commands;
mod utils;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{
    CompressArgs, DecompressArgs, cmd_compress, cmd_decompress, cmd_detect, cmd_info, cmd_ratio,
};
use oxiflate::config::DEFAULT_MAX_OUTPUT;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt;

#[derive(Parser)]
#[command(name = "oxiflate")]
#[command(author, version, about = "Pure Rust zlib/gzip compression")]
#[command(long_about = "
oxiflate compresses and decompresses zlib and gzip files with its own
DEFLATE implementation.

Examples:
  oxiflate compress data.bin              # writes data.bin.zz
  oxiflate compress --gzip -l 9 log.txt   # writes log.txt.gz
  oxiflate decompress log.txt.gz          # writes log.txt
  oxiflate detect unknown.bin
  oxiflate info --json log.txt.gz
  oxiflate ratio 1000 250
  oxiflate completions bash > oxiflate.bash
")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: input + .zz, or + .gz with --gzip)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level (0-9)
        #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(i32).range(0..=9))]
        level: i32,

        /// Write gzip instead of zlib
        #[arg(short, long)]
        gzip: bool,

        /// Overwrite the output without asking
        #[arg(short, long)]
        force: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Decompress a zlib or gzip file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: input without .gz/.zz/.zlib)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail if the output would exceed this many bytes
        #[arg(long)]
        max_output: Option<u64>,

        /// Overwrite the output without asking
        #[arg(short, long)]
        force: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Detect the container format of a file
    Detect {
        /// File to inspect
        file: PathBuf,
    },

    /// Show format, header fields and sizes of a compressed file
    #[command(alias = "i")]
    Info {
        /// Compressed file
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Stop decoding past this many bytes
        #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT)]
        max_output: u64,
    },

    /// Print compressed size as a percentage of the original size
    Ratio {
        /// Original size in bytes
        original: u64,

        /// Compressed size in bytes
        compressed: u64,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            gzip,
            force,
            no_progress,
        } => cmd_compress(&CompressArgs {
            input,
            output,
            level,
            gzip,
            force,
            progress: !no_progress,
        }),
        Commands::Decompress {
            input,
            output,
            max_output,
            force,
            no_progress,
        } => cmd_decompress(&DecompressArgs {
            input,
            output,
            max_output,
            force,
            progress: !no_progress,
        }),
        Commands::Detect { file } => cmd_detect(&file),
        Commands::Info {
            file,
            json,
            max_output,
        } => cmd_info(&file, json, max_output),
        Commands::Ratio {
            original,
            compressed,
        } => {
            cmd_ratio(original, compressed);
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "oxiflate", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::parse_from(["oxiflate", "-vv", "compress", "-l", "9", "--gzip", "a.txt"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compress {
                level, gzip, input, ..
            } => {
                assert_eq!(level, 9);
                assert!(gzip);
                assert_eq!(input, PathBuf::from("a.txt"));
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_info_default_ceiling() {
        let cli = Cli::parse_from(["oxiflate", "info", "a.gz"]);
        match cli.command {
            Commands::Info { max_output, .. } => assert_eq!(max_output, DEFAULT_MAX_OUTPUT),
            _ => panic!("expected info"),
        }
    }

    #[test]
    fn test_level_range_enforced() {
        assert!(Cli::try_parse_from(["oxiflate", "compress", "-l", "10", "a"]).is_err());
    }
}
