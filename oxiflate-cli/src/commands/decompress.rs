//! Decompress command implementation.

use crate::utils::{confirm_overwrite, create_progress_bar, decompressed_output_path, human_size};
use filetime::FileTime;
use oxiflate::adapters::{open_input, write_atomically};
use oxiflate::{StreamOptions, decompress_stream_with};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Arguments of `oxiflate decompress`.
pub struct DecompressArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub max_output: Option<u64>,
    pub force: bool,
    pub progress: bool,
}

pub fn cmd_decompress(args: &DecompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| decompressed_output_path(&args.input));
    if output == args.input {
        return Err("output would overwrite the input; pass --output".into());
    }
    confirm_overwrite(&output, args.force)?;

    let mut stream = StreamOptions::default();
    if let Some(limit) = args.max_output {
        stream = stream.max_output(limit);
    }

    let len = std::fs::metadata(&args.input)?.len();
    let pb = create_progress_bar(len, args.progress);
    pb.set_message("decompressing");
    let reader = pb.wrap_read(open_input(&args.input)?);

    let summary = write_atomically(&output, |writer| {
        decompress_stream_with(reader, writer, &stream)
    })?;
    pb.finish_and_clear();

    if let Some(mtime) = summary.gzip_header.as_ref().map(|h| h.mtime).filter(|&m| m > 0) {
        let time = FileTime::from_unix_time(i64::from(mtime), 0);
        if let Err(e) = filetime::set_file_mtime(&output, time) {
            warn!(output = %output.display(), "could not restore modification time: {}", e);
        }
    }

    debug!(
        input = %args.input.display(),
        output = %output.display(),
        format = ?summary.format,
        "decompressed"
    );
    println!(
        "{} -> {} ({} -> {})",
        args.input.display(),
        output.display(),
        human_size(summary.bytes_in),
        human_size(summary.bytes_out)
    );

    Ok(())
}
