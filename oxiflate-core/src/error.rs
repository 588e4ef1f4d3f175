//! Error types for oxiflate operations.
//!
//! Every failure surfaced by the codec, the container framing, and the
//! stream/file adapters is a [`FlateError`]. Variants carry the detail needed
//! for a useful message; [`FlateError::kind`] folds them into the small
//! [`ErrorKind`] taxonomy callers are expected to match on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`FlateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Compression level outside 0-9.
    InvalidLevel,
    /// Checksum mismatch, invalid Huffman code, malformed header or body.
    CorruptData,
    /// Input ended in the middle of a block, header or trailer.
    TruncatedStream,
    /// Reserved DEFLATE block type (3).
    InvalidBlockType,
    /// Back-reference pointing before the start of the window.
    InvalidDistance,
    /// Neither a zlib nor a gzip signature.
    UnrecognizedFormat,
    /// Decoded output would exceed the configured ceiling.
    OutputTooLarge,
    /// File or stream I/O failure.
    Io,
    /// Operation stopped by a cancellation signal.
    Cancelled,
    /// Rejected configuration value.
    InvalidConfig,
}

/// The main error type for oxiflate operations.
#[derive(Debug, Error)]
pub enum FlateError {
    /// Compression level outside the accepted range.
    #[error("Invalid compression level {level}: must be between 0 and 9")]
    InvalidLevel {
        /// The rejected level.
        level: i32,
    },

    /// Integrity check failed (Adler-32, CRC-32, or uncompressed size).
    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Value stored in the stream.
        expected: u32,
        /// Value computed over the decoded data.
        computed: u32,
    },

    /// Bit pattern that matches no code of the active Huffman table.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where decoding gave up.
        bit_position: u64,
    },

    /// Structurally invalid compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid zlib or gzip header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Input ended before the stream was complete.
    #[error("Truncated stream: input ended at bit position {bit_position}")]
    TruncatedStream {
        /// Bit position at which more input was required.
        bit_position: u64,
    },

    /// Block header announced the reserved block type.
    #[error("Invalid block type {block_type}")]
    InvalidBlockType {
        /// The 2-bit BTYPE value.
        block_type: u8,
    },

    /// Back-reference distance larger than the available history.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The offending distance.
        distance: usize,
        /// Bytes of history available when the reference was decoded.
        history_size: usize,
    },

    /// Encoder asked to emit a symbol that has no code in the table.
    #[error("Symbol {symbol} has no code in this Huffman table")]
    UnknownSymbol {
        /// The unused symbol.
        symbol: u16,
    },

    /// Input carries neither a zlib nor a gzip header.
    #[error("Unrecognized format: leading bytes {found:02x?}")]
    UnrecognizedFormat {
        /// Up to the first two bytes of the input.
        found: Vec<u8>,
    },

    /// Decoding would produce more bytes than allowed.
    #[error("Decompressed output exceeds the limit of {limit} bytes")]
    OutputTooLarge {
        /// The ceiling that was hit.
        limit: u64,
    },

    /// A cancellation token fired between chunks.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid option value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Which option was rejected and why.
        message: String,
    },

    /// File operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    FileIo {
        /// Path of the file being opened, read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for oxiflate operations.
pub type Result<T> = std::result::Result<T, FlateError>;

impl FlateError {
    /// Create an invalid level error.
    pub fn invalid_level(level: i32) -> Self {
        Self::InvalidLevel { level }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a truncated stream error.
    pub fn truncated(bit_position: u64) -> Self {
        Self::TruncatedStream { bit_position }
    }

    /// Create an invalid block type error.
    pub fn invalid_block_type(block_type: u8) -> Self {
        Self::InvalidBlockType { block_type }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an unknown symbol error.
    pub fn unknown_symbol(symbol: u16) -> Self {
        Self::UnknownSymbol { symbol }
    }

    /// Create an unrecognized format error from the leading input bytes.
    pub fn unrecognized_format(data: &[u8]) -> Self {
        Self::UnrecognizedFormat {
            found: data[..data.len().min(2)].to_vec(),
        }
    }

    /// Create an output too large error.
    pub fn output_too_large(limit: u64) -> Self {
        Self::OutputTooLarge { limit }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Attach a path to an I/O error.
    pub fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLevel { .. } => ErrorKind::InvalidLevel,
            Self::ChecksumMismatch { .. }
            | Self::InvalidHuffmanCode { .. }
            | Self::CorruptData { .. }
            | Self::InvalidHeader { .. }
            | Self::UnknownSymbol { .. } => ErrorKind::CorruptData,
            Self::TruncatedStream { .. } => ErrorKind::TruncatedStream,
            Self::InvalidBlockType { .. } => ErrorKind::InvalidBlockType,
            Self::InvalidDistance { .. } => ErrorKind::InvalidDistance,
            Self::UnrecognizedFormat { .. } => ErrorKind::UnrecognizedFormat,
            Self::OutputTooLarge { .. } => ErrorKind::OutputTooLarge,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::FileIo { .. } | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Map an I/O error raised while reading compressed input.
    ///
    /// `UnexpectedEof` means the compressed stream ended early, which is a
    /// truncation rather than an I/O failure.
    pub fn from_read(err: io::Error, bit_position: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::truncated(bit_position)
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlateError::invalid_level(10);
        assert!(err.to_string().contains("between 0 and 9"));

        let err = FlateError::checksum_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("Checksum mismatch"));

        let err = FlateError::unrecognized_format(&[0x50, 0x4B, 0x03]);
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FlateError::invalid_level(-1).kind(), ErrorKind::InvalidLevel);
        assert_eq!(FlateError::checksum_mismatch(1, 2).kind(), ErrorKind::CorruptData);
        assert_eq!(FlateError::invalid_huffman(7).kind(), ErrorKind::CorruptData);
        assert_eq!(FlateError::unknown_symbol(300).kind(), ErrorKind::CorruptData);
        assert_eq!(FlateError::truncated(0).kind(), ErrorKind::TruncatedStream);
        assert_eq!(
            FlateError::invalid_block_type(3).kind(),
            ErrorKind::InvalidBlockType
        );
        assert_eq!(
            FlateError::invalid_distance(40, 3).kind(),
            ErrorKind::InvalidDistance
        );
        assert_eq!(
            FlateError::output_too_large(1024).kind(),
            ErrorKind::OutputTooLarge
        );
        assert_eq!(FlateError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: FlateError = io_err.into();
        assert!(matches!(err, FlateError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_from_read_maps_eof_to_truncation() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(
            FlateError::from_read(eof, 42),
            FlateError::TruncatedStream { bit_position: 42 }
        ));

        let other = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(FlateError::from_read(other, 0), FlateError::Io(_)));
    }

    #[test]
    fn test_file_io_carries_path() {
        let err = FlateError::file_io(
            "/tmp/missing.z",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.z"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
