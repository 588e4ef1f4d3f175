//! Stream inspection: format, headers, sizes and block makeup.

use crate::config::DEFAULT_MAX_OUTPUT;
use crate::container::{Format, FrameDecoder, compression_ratio, detect};
use crate::deflate::BlockStats;
use crate::gzip::GzipHeader;
use crate::zlib::ZlibHeader;
use oxiflate_core::error::{FlateError, Result};

/// Facts about a compressed stream.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Detected container.
    pub format: Format,
    /// Compressed bytes through the last trailer (trailing data excluded).
    pub compressed_size: u64,
    /// Decompressed size.
    pub uncompressed_size: u64,
    /// Compressed size as a percentage of the uncompressed size.
    pub ratio: f64,
    /// zlib header, for zlib streams.
    pub zlib_header: Option<ZlibHeader>,
    /// Header of every gzip member.
    pub gzip_members: Vec<GzipHeader>,
    /// DEFLATE blocks by type.
    pub blocks: BlockStats,
}

/// Decode `data` fully, discarding the output, and report what it holds.
///
/// Every checksum is verified, so a successful inspection also means the
/// stream is intact. Decoding stops with [`FlateError::OutputTooLarge`] past
/// [`DEFAULT_MAX_OUTPUT`] bytes; see [`inspect_with_limit`].
///
/// # Example
///
/// ```
/// use oxiflate::{Format, compress, inspect};
///
/// let compressed = compress(&[b'z'; 1000], 9).unwrap();
/// let info = inspect(&compressed).unwrap();
/// assert_eq!(info.format, Format::Zlib);
/// assert_eq!(info.uncompressed_size, 1000);
/// ```
pub fn inspect(data: &[u8]) -> Result<StreamInfo> {
    inspect_with_limit(data, DEFAULT_MAX_OUTPUT)
}

/// [`inspect`] with an explicit ceiling on the decoded size.
pub fn inspect_with_limit(data: &[u8], max_output: u64) -> Result<StreamInfo> {
    let format = detect(data).ok_or_else(|| FlateError::unrecognized_format(data))?;
    let summary = FrameDecoder::new(format)
        .limit(Some(max_output))
        .decode(data, &mut std::io::sink())?;

    Ok(StreamInfo {
        format,
        compressed_size: summary.bytes_in,
        uncompressed_size: summary.bytes_out,
        ratio: compression_ratio(summary.bytes_out, summary.bytes_in),
        zlib_header: summary.zlib_header,
        gzip_members: summary.gzip_members,
        blocks: summary.blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompressOptions, CompressionLevel};
    use crate::zlib::ZlibLevel;
    use oxiflate_core::ErrorKind;

    #[test]
    fn test_inspect_zlib() {
        let input = b"inspect inspect inspect inspect";
        let compressed = crate::compress(input, 1).unwrap();
        let info = inspect(&compressed).unwrap();

        assert_eq!(info.format, Format::Zlib);
        assert_eq!(info.compressed_size, compressed.len() as u64);
        assert_eq!(info.uncompressed_size, input.len() as u64);
        assert_eq!(info.zlib_header.unwrap().level, ZlibLevel::Fastest);
        assert!(info.gzip_members.is_empty());
        assert!(info.blocks.total() >= 1);
    }

    #[test]
    fn test_inspect_gzip_members() {
        let header = GzipHeader::new().filename("a.txt").mtime(42);
        let options = CompressOptions::new(CompressionLevel::DEFAULT).gzip_header(header);
        let mut data = crate::compress_with(b"one", &options).unwrap();
        let first_len = data.len() as u64;
        data.extend(crate::compress_with(b"two", &options).unwrap());
        data.extend_from_slice(b"\0\0");

        let info = inspect(&data).unwrap();
        assert_eq!(info.format, Format::Gzip);
        assert_eq!(info.gzip_members.len(), 2);
        assert_eq!(info.gzip_members[0].filename.as_deref(), Some("a.txt"));
        assert_eq!(info.gzip_members[1].mtime, 42);
        assert_eq!(info.uncompressed_size, 6);
        assert_eq!(info.compressed_size, data.len() as u64 - 2);
        assert!(info.compressed_size > first_len);
    }

    #[test]
    fn test_inspect_stored_blocks() {
        let compressed = crate::compress(b"stored", 0).unwrap();
        let info = inspect(&compressed).unwrap();
        assert_eq!(info.blocks.stored, 1);
        assert_eq!(info.blocks.total(), 1);
    }

    #[test]
    fn test_inspect_output_ceiling() {
        let compressed = crate::compress(&vec![0u8; 200_000], 9).unwrap();

        let err = inspect_with_limit(&compressed, 100_000).unwrap_err();
        assert!(matches!(err, FlateError::OutputTooLarge { limit: 100_000 }));

        let info = inspect_with_limit(&compressed, 200_000).unwrap();
        assert_eq!(info.uncompressed_size, 200_000);
    }

    #[test]
    fn test_inspect_rejects_unknown() {
        assert_eq!(
            inspect(b"plain text").unwrap_err().kind(),
            ErrorKind::UnrecognizedFormat
        );
    }
}
