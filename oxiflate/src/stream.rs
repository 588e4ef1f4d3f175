//! Chunked, bounded-memory compression and decompression over `Read` and
//! `Write`.
//!
//! Compression reads one chunk ahead so the final chunk is known when it is
//! encoded; decompression hands output to the writer every `chunk_size`
//! bytes. Compressed bytes are buffered in `chunk_size` blocks on both
//! sides, so the caller's reader and writer see chunk-sized I/O. Peak memory is two chunks plus the 32 KiB window and the encoder's
//! match tables, whatever the stream length.
//!
//! A [`CancelToken`](crate::CancelToken) in [`StreamOptions`] is checked
//! between chunks. On cancellation the writer holds a truncated stream and
//! the call returns [`FlateError::Cancelled`].

use crate::config::{CompressOptions, CompressionLevel, StreamOptions};
use crate::container::{Format, FrameDecoder, FrameEncoder, detect};
use crate::gzip::GzipHeader;
use oxiflate_core::error::{FlateError, Result};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use tracing::{debug, trace};

/// Byte counts of a finished stream operation.
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    /// Bytes read from the input.
    pub bytes_in: u64,
    /// Bytes written to the output.
    pub bytes_out: u64,
    /// Container written or detected; `None` for empty input.
    pub format: Option<Format>,
    /// First gzip member's header, when decompressing gzip.
    pub gzip_header: Option<GzipHeader>,
}

/// Counts bytes on their way to the inner writer.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Read until `buf` is full or the input ends.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Compress `reader` into `writer` as zlib at `level` (0-9).
///
/// Empty input writes nothing.
pub fn compress_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    level: i32,
) -> Result<StreamSummary> {
    let options = CompressOptions::new(CompressionLevel::new(level)?);
    compress_stream_with(reader, writer, &options, &StreamOptions::default())
}

/// Compress `reader` into `writer` with explicit options.
pub fn compress_stream_with<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    options: &CompressOptions,
    stream: &StreamOptions,
) -> Result<StreamSummary> {
    stream.validate()?;

    let mut current = vec![0u8; stream.chunk_size];
    let mut current_len = read_full(&mut reader, &mut current)?;
    if current_len == 0 {
        return Ok(StreamSummary::default());
    }

    let counter = CountingWriter {
        inner: BufWriter::with_capacity(stream.chunk_size, writer),
        count: 0,
    };
    let mut encoder = FrameEncoder::new(counter, options)?;
    let mut next = vec![0u8; stream.chunk_size];

    loop {
        stream.check_cancel().inspect_err(|_| {
            debug!(bytes_in = encoder.bytes_in(), "compress stream cancelled");
        })?;

        let next_len = read_full(&mut reader, &mut next)?;
        let is_final = next_len == 0;
        encoder.write_chunk(&current[..current_len], is_final)?;
        trace!(
            chunk = current_len,
            bytes_in = encoder.bytes_in(),
            bytes_out = encoder.bytes_out(),
            "compressed chunk"
        );

        if is_final {
            break;
        }
        std::mem::swap(&mut current, &mut next);
        current_len = next_len;
    }

    let bytes_in = encoder.bytes_in();
    let mut counter = encoder.finish()?;
    counter.flush()?;

    Ok(StreamSummary {
        bytes_in,
        bytes_out: counter.count,
        format: Some(options.format),
        gzip_header: None,
    })
}

/// Decompress a zlib or gzip stream from `reader` into `writer`.
///
/// The format is detected from the first two bytes. Empty input writes
/// nothing.
pub fn decompress_stream<R: Read, W: Write>(reader: R, writer: W) -> Result<StreamSummary> {
    decompress_stream_with(reader, writer, &StreamOptions::default())
}

/// Decompress with explicit chunking, output ceiling and cancellation.
pub fn decompress_stream_with<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    stream: &StreamOptions,
) -> Result<StreamSummary> {
    stream.validate()?;

    let mut head = [0u8; 2];
    let head_len = read_full(&mut reader, &mut head)?;
    if head_len == 0 {
        return Ok(StreamSummary::default());
    }
    let head = &head[..head_len];
    let format = detect(head).ok_or_else(|| FlateError::unrecognized_format(head))?;

    let input = BufReader::with_capacity(stream.chunk_size, head.chain(reader));
    let summary = FrameDecoder::new(format)
        .limit(stream.max_output)
        .chunk_size(stream.chunk_size)
        .cancel(stream.cancel.clone())
        .decode(input, &mut writer)?;
    writer.flush()?;

    Ok(StreamSummary {
        bytes_in: summary.bytes_in,
        bytes_out: summary.bytes_out,
        format: Some(format),
        gzip_header: summary.gzip_members.into_iter().next(),
    })
}
