//! Compress command implementation.

use crate::utils::{compressed_output_path, confirm_overwrite, create_progress_bar, human_size};
use oxiflate::adapters::{open_input, write_atomically};
use oxiflate::{
    CompressOptions, CompressionLevel, Format, GzipHeader, StreamOptions, compress_stream_with,
    compression_ratio,
};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Arguments of `oxiflate compress`.
pub struct CompressArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub level: i32,
    pub gzip: bool,
    pub force: bool,
    pub progress: bool,
}

pub fn cmd_compress(args: &CompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let level = CompressionLevel::new(args.level)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| compressed_output_path(&args.input, args.gzip));
    confirm_overwrite(&output, args.force)?;

    let metadata = std::fs::metadata(&args.input)?;
    let mut options = CompressOptions::new(level);
    if args.gzip {
        options = options
            .format(Format::Gzip)
            .gzip_header(header_for(&args.input, &metadata));
    }

    let pb = create_progress_bar(metadata.len(), args.progress);
    pb.set_message("compressing");
    let reader = pb.wrap_read(open_input(&args.input)?);

    let summary = write_atomically(&output, |writer| {
        compress_stream_with(reader, writer, &options, &StreamOptions::default())
    })?;
    pb.finish_and_clear();

    debug!(
        input = %args.input.display(),
        output = %output.display(),
        level = level.value(),
        "compressed"
    );
    println!(
        "{} -> {} ({} -> {}, {:.1}%)",
        args.input.display(),
        output.display(),
        human_size(summary.bytes_in),
        human_size(summary.bytes_out),
        compression_ratio(summary.bytes_in, summary.bytes_out)
    );

    Ok(())
}

/// Gzip header carrying the input's file name and modification time.
fn header_for(input: &Path, metadata: &std::fs::Metadata) -> GzipHeader {
    let mut header = GzipHeader::new().os(oxiflate::gzip::OS_UNIX);
    if let Some(name) = input.file_name().and_then(|n| n.to_str()) {
        header = header.filename(name);
    }
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| u32::try_from(d.as_secs()).ok());
    if let Some(mtime) = mtime {
        header = header.mtime(mtime);
    }
    header
}
