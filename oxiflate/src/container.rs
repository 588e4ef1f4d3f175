//! Container framing shared by zlib and gzip.
//!
//! [`FrameEncoder`] writes a header, feeds chunks through a [`Deflater`] and
//! finishes with the format's checksum trailer. [`FrameDecoder`] does the
//! reverse for one zlib stream or a sequence of gzip members, verifying
//! every trailer as it goes.

use crate::config::{CancelToken, CompressOptions, DEFAULT_CHUNK_SIZE};
use crate::deflate::{BlockStats, Deflater};
use crate::gzip::{self, GZIP_MAGIC, GzipHeader};
use crate::inflate::Inflater;
use crate::zlib::ZlibHeader;
use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::{Adler32, BitReader, BitWriter, Checksum, Crc32};
use std::io::{Read, Write};
use tracing::debug;

/// The four header signatures the reference zlib emits (levels 0-1, 2-5, 6,
/// and 7-9).
pub const ZLIB_SIGNATURES: [[u8; 2]; 4] = [[0x78, 0x01], [0x78, 0x5E], [0x78, 0x9C], [0x78, 0xDA]];

/// Container format around a DEFLATE stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// RFC 1950: 2-byte header, Adler-32 trailer.
    #[default]
    Zlib,
    /// RFC 1952: magic 1F 8B, CRC-32 + ISIZE trailer.
    Gzip,
}

impl Format {
    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Zlib => "zlib",
            Self::Gzip => "gzip",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identify the container from its first bytes.
///
/// Gzip is recognised by its magic; zlib by a header that passes full
/// validation (method, window size, FCHECK, no dictionary).
pub fn detect(data: &[u8]) -> Option<Format> {
    if data.starts_with(&GZIP_MAGIC) {
        Some(Format::Gzip)
    } else if ZlibHeader::is_valid(data) {
        Some(Format::Zlib)
    } else {
        None
    }
}

/// Whether the first two bytes are one of the four common zlib signatures.
///
/// This is a heuristic, not a validator: arbitrary binary data starting with
/// `78 9C` passes, and valid zlib streams with smaller windows do not. Use
/// [`detect`] for a header check.
pub fn is_zlib_format(data: &[u8]) -> bool {
    data.len() >= 2 && ZLIB_SIGNATURES.iter().any(|sig| data[..2] == sig[..])
}

/// Compressed size as a percentage of the original; 0 for an empty original.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        0.0
    } else {
        compressed_size as f64 / original_size as f64 * 100.0
    }
}

/// Running checksum of either container.
#[derive(Debug, Clone)]
enum FrameChecksum {
    Adler32(Adler32),
    Crc32(Crc32),
}

impl FrameChecksum {
    fn for_format(format: Format) -> Self {
        match format {
            Format::Zlib => Self::Adler32(Adler32::new()),
            Format::Gzip => Self::Crc32(Crc32::new()),
        }
    }
}

impl Checksum for FrameChecksum {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Adler32(c) => Checksum::update(c, data),
            Self::Crc32(c) => Checksum::update(c, data),
        }
    }

    fn value(&self) -> u32 {
        match self {
            Self::Adler32(c) => Checksum::value(c),
            Self::Crc32(c) => Checksum::value(c),
        }
    }
}

/// A writer that checksums and counts everything passing through it.
#[derive(Debug)]
pub struct ChecksumWriter<W, C> {
    inner: W,
    checksum: C,
    count: u64,
}

impl<W: Write, C: Checksum> ChecksumWriter<W, C> {
    /// Wrap `inner`.
    pub fn new(inner: W, checksum: C) -> Self {
        Self {
            inner,
            checksum,
            count: 0,
        }
    }

    /// Checksum of the bytes written so far.
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    /// Bytes written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write, C: Checksum> Write for ChecksumWriter<W, C> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.checksum.update(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Incremental encoder for one zlib stream or gzip member.
#[derive(Debug)]
pub struct FrameEncoder<W: Write> {
    writer: BitWriter<W>,
    deflater: Deflater,
    format: Format,
    checksum: FrameChecksum,
    bytes_in: u64,
    finished: bool,
}

impl<W: Write> FrameEncoder<W> {
    /// Write the header and get ready for data.
    pub fn new(writer: W, options: &CompressOptions) -> Result<Self> {
        let mut writer = BitWriter::new(writer);
        match options.format {
            Format::Zlib => writer.write_bytes(&ZlibHeader::for_level(options.level).to_bytes())?,
            Format::Gzip => writer.write_bytes(&options.gzip_header.encode(options.level)?)?,
        }

        Ok(Self {
            writer,
            deflater: Deflater::new(options.level),
            format: options.format,
            checksum: FrameChecksum::for_format(options.format),
            bytes_in: 0,
            finished: false,
        })
    }

    /// Uncompressed bytes consumed so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Compressed bytes produced so far (header included).
    pub fn bytes_out(&self) -> u64 {
        self.writer.bits_written().div_ceil(8)
    }

    /// Blocks written so far.
    pub fn stats(&self) -> BlockStats {
        self.deflater.stats()
    }

    /// Compress the next chunk. Set `is_final` on the last one.
    pub fn write_chunk(&mut self, data: &[u8], is_final: bool) -> Result<()> {
        if self.finished {
            return Err(FlateError::invalid_config("frame already finished"));
        }
        self.checksum.update(data);
        self.bytes_in += data.len() as u64;
        self.deflater.write_data(&mut self.writer, data, is_final)?;
        self.finished = is_final;
        Ok(())
    }

    /// Close the stream with the checksum trailer and return the writer.
    pub fn finish(mut self) -> Result<W> {
        if !self.finished {
            self.write_chunk(&[], true)?;
        }
        self.writer.align_to_byte()?;

        let checksum = self.checksum.value();
        match self.format {
            Format::Zlib => self.writer.write_bytes(&checksum.to_be_bytes())?,
            Format::Gzip => {
                self.writer.write_bytes(&checksum.to_le_bytes())?;
                self.writer.write_bytes(&(self.bytes_in as u32).to_le_bytes())?;
            }
        }

        debug!(
            format = %self.format,
            bytes_in = self.bytes_in,
            bytes_out = self.bytes_out(),
            "frame finished"
        );
        self.writer.finish()
    }
}

/// Compress `input` into one complete frame.
pub(crate) fn encode_frame(input: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    let mut encoder = FrameEncoder::new(Vec::with_capacity(input.len() / 2 + 32), options)?;
    encoder.write_chunk(input, true)?;
    encoder.finish()
}

/// What a decode pass saw.
#[derive(Debug, Clone, Default)]
pub struct FrameSummary {
    /// Compressed bytes up to the end of the last trailer.
    pub bytes_in: u64,
    /// Decompressed bytes produced.
    pub bytes_out: u64,
    /// zlib header, when the input was zlib.
    pub zlib_header: Option<ZlibHeader>,
    /// Headers of every gzip member, in order.
    pub gzip_members: Vec<GzipHeader>,
    /// Blocks decoded, over all members.
    pub blocks: BlockStats,
}

/// Decoder for a framed stream.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    format: Format,
    limit: Option<u64>,
    chunk_size: usize,
    cancel: Option<CancelToken>,
}

impl FrameDecoder {
    /// Decoder for `format` with no limit.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            limit: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: None,
        }
    }

    /// Fail past `limit` decompressed bytes.
    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Hand output to the writer in chunks of this size.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Stop when `token` is cancelled.
    pub fn cancel(mut self, token: Option<CancelToken>) -> Self {
        self.cancel = token;
        self
    }

    /// Decode everything from `reader` into `sink`.
    pub fn decode<R: Read, W: Write>(&self, reader: R, sink: &mut W) -> Result<FrameSummary> {
        let mut reader = BitReader::new(reader);
        let mut summary = FrameSummary::default();

        match self.format {
            Format::Zlib => {
                let mut bytes = [0u8; 2];
                reader.read_bytes(&mut bytes)?;
                summary.zlib_header = Some(ZlibHeader::parse(bytes)?);

                let mut out = ChecksumWriter::new(&mut *sink, Adler32::new());
                let mut inflater = self.inflater(self.limit);
                inflater.inflate_to(&mut reader, &mut out)?;
                summary.blocks = inflater.stats();

                reader.align_to_byte();
                let mut trailer = [0u8; 4];
                reader.read_bytes(&mut trailer)?;
                let expected = u32::from_be_bytes(trailer);
                if expected != out.checksum() {
                    return Err(FlateError::checksum_mismatch(expected, out.checksum()));
                }
                summary.bytes_out = out.count();
                summary.bytes_in = reader.bit_position() / 8;
            }
            Format::Gzip => {
                let mut header = GzipHeader::read(&mut reader)?;
                loop {
                    summary.gzip_members.push(header);
                    self.decode_gzip_member(&mut reader, sink, &mut summary)?;
                    summary.bytes_in = reader.bit_position() / 8;

                    match next_member(&mut reader)? {
                        Some(next) => header = next,
                        None => break,
                    }
                }
            }
        }

        debug!(
            format = %self.format,
            bytes_in = summary.bytes_in,
            bytes_out = summary.bytes_out,
            "frame decoded"
        );
        Ok(summary)
    }

    fn inflater(&self, limit: Option<u64>) -> Inflater {
        let mut inflater = Inflater::new().with_flush_threshold(self.chunk_size);
        if let Some(limit) = limit {
            inflater = inflater.with_limit(limit);
        }
        if let Some(token) = &self.cancel {
            inflater = inflater.with_cancel(token.clone());
        }
        inflater
    }

    fn decode_gzip_member<R: Read, W: Write>(
        &self,
        reader: &mut BitReader<R>,
        sink: &mut W,
        summary: &mut FrameSummary,
    ) -> Result<()> {
        let remaining = self.limit.map(|limit| limit.saturating_sub(summary.bytes_out));

        let mut out = ChecksumWriter::new(&mut *sink, Crc32::new());
        let mut inflater = self.inflater(remaining);
        inflater.inflate_to(reader, &mut out).map_err(|err| match (err, self.limit) {
            (FlateError::OutputTooLarge { .. }, Some(limit)) => FlateError::output_too_large(limit),
            (err, _) => err,
        })?;

        let stats = inflater.stats();
        summary.blocks.stored += stats.stored;
        summary.blocks.fixed += stats.fixed;
        summary.blocks.dynamic += stats.dynamic;

        reader.align_to_byte();
        let mut trailer = [0u8; gzip::TRAILER_SIZE];
        reader.read_bytes(&mut trailer)?;
        let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let expected_size = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

        if expected_crc != out.checksum() {
            return Err(FlateError::checksum_mismatch(expected_crc, out.checksum()));
        }
        if expected_size != out.count() as u32 {
            return Err(FlateError::corrupted(
                reader.bit_position() / 8,
                format!(
                    "gzip ISIZE {} does not match decoded size {}",
                    expected_size,
                    out.count() as u32
                ),
            ));
        }

        summary.bytes_out += out.count();
        Ok(())
    }
}

/// After a gzip member: the header of the next one, or `None` at the end of
/// input. Anything after the last member that is not a gzip magic is
/// ignored.
fn next_member<R: Read>(reader: &mut BitReader<R>) -> Result<Option<GzipHeader>> {
    let mut byte = [0u8; 1];
    match reader.read_bytes(&mut byte) {
        Ok(()) => {}
        Err(FlateError::TruncatedStream { .. }) => return Ok(None),
        Err(err) => return Err(err),
    }

    if byte[0] == GZIP_MAGIC[0] {
        match reader.read_bytes(&mut byte) {
            Ok(()) if byte[0] == GZIP_MAGIC[1] => {
                return GzipHeader::read_after_magic(reader).map(Some);
            }
            Ok(()) | Err(FlateError::TruncatedStream { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    debug!(
        offset = reader.bit_position() / 8,
        "ignoring trailing data after last gzip member"
    );
    Ok(None)
}
