//! Zlib format wrapper for DEFLATE compression.
//!
//! The zlib format (RFC 1950) wraps raw DEFLATE data with a header and
//! an Adler-32 checksum.
//!
//! # Format
//!
//! ```text
//! +---+---+============+---+---+---+---+
//! |CMF|FLG| compressed |    ADLER32    |
//! +---+---+============+---+---+---+---+
//! ```
//!
//! - CMF: Compression Method and Flags
//!   - Bits 0-3: CM (Compression Method) - must be 8 for DEFLATE
//!   - Bits 4-7: CINFO (Compression Info) - log2(window size) - 8
//! - FLG: Flags
//!   - Bits 0-4: FCHECK - check bits so (CMF*256 + FLG) mod 31 == 0
//!   - Bit 5: FDICT - preset dictionary present
//!   - Bits 6-7: FLEVEL - compression level (0-3)
//! - Compressed data (DEFLATE format)
//! - ADLER32: Adler-32 checksum of uncompressed data (big-endian)

use crate::config::{CompressOptions, CompressionLevel, DecompressOptions};
use crate::container::Format;
use oxiflate_core::error::{FlateError, Result};

/// CM value for DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Largest CINFO (32 KiB window).
pub const MAX_CINFO: u8 = 7;

/// Length of the zlib header.
pub const HEADER_SIZE: usize = 2;

/// Length of the Adler-32 trailer.
pub const TRAILER_SIZE: usize = 4;

/// Zlib compression level indicator in header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZlibLevel {
    /// Fastest compression.
    Fastest = 0,
    /// Fast compression.
    Fast = 1,
    /// Default compression.
    Default = 2,
    /// Maximum compression.
    Maximum = 3,
}

impl ZlibLevel {
    /// FLEVEL written for a compression level.
    pub fn from_level(level: CompressionLevel) -> Self {
        match level.value() {
            0..=1 => Self::Fastest,
            2..=5 => Self::Fast,
            6 => Self::Default,
            _ => Self::Maximum,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Fastest,
            1 => Self::Fast,
            2 => Self::Default,
            _ => Self::Maximum,
        }
    }
}

/// Parsed zlib header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibHeader {
    /// Window size as log2 (8-15).
    pub window_bits: u8,
    /// Advisory compression level.
    pub level: ZlibLevel,
}

impl ZlibHeader {
    /// Header for a 32 KiB window at the given level.
    pub fn for_level(level: CompressionLevel) -> Self {
        Self {
            window_bits: MAX_CINFO + 8,
            level: ZlibLevel::from_level(level),
        }
    }

    /// Encode as CMF, FLG.
    pub fn to_bytes(&self) -> [u8; 2] {
        let cmf = ((self.window_bits - 8) << 4) | CM_DEFLATE;
        let flg = (self.level as u8) << 6;
        let remainder = (u16::from(cmf) * 256 + u16::from(flg)) % 31;
        let fcheck = if remainder == 0 { 0 } else { 31 - remainder as u8 };
        [cmf, flg | fcheck]
    }

    /// Parse and validate a header.
    ///
    /// Rejects a method other than DEFLATE, a window larger than 32 KiB,
    /// a failing FCHECK, and a preset dictionary (not supported).
    pub fn parse(bytes: [u8; 2]) -> Result<Self> {
        let [cmf, flg] = bytes;

        if cmf & 0x0F != CM_DEFLATE {
            return Err(FlateError::invalid_header(format!(
                "unsupported zlib compression method {}",
                cmf & 0x0F
            )));
        }

        let cinfo = cmf >> 4;
        if cinfo > MAX_CINFO {
            return Err(FlateError::invalid_header(format!(
                "zlib window too large: CINFO={}",
                cinfo
            )));
        }

        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
            return Err(FlateError::invalid_header("zlib header check failed"));
        }

        if flg & 0x20 != 0 {
            return Err(FlateError::invalid_header(
                "zlib preset dictionaries are not supported",
            ));
        }

        Ok(Self {
            window_bits: cinfo + 8,
            level: ZlibLevel::from_bits(flg >> 6),
        })
    }

    /// Whether the first two bytes of `data` form a valid header.
    pub fn is_valid(data: &[u8]) -> bool {
        match data {
            [cmf, flg, ..] => Self::parse([*cmf, *flg]).is_ok(),
            _ => false,
        }
    }
}

/// Compress data using zlib format.
///
/// # Example
///
/// ```
/// use oxiflate::CompressionLevel;
/// use oxiflate::zlib::{compress_zlib, decompress_zlib};
///
/// let data = b"Hello, World! Hello, World!";
/// let compressed = compress_zlib(data, CompressionLevel::DEFAULT).unwrap();
/// assert_eq!(&compressed[..2], &[0x78, 0x9C]);
/// assert_eq!(decompress_zlib(&compressed).unwrap(), data);
/// ```
pub fn compress_zlib(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let options = CompressOptions::new(level).format(Format::Zlib);
    crate::container::encode_frame(input, &options)
}

/// Decompress a zlib stream, verifying header and Adler-32.
pub fn decompress_zlib(input: &[u8]) -> Result<Vec<u8>> {
    crate::api::decode_with(input, Format::Zlib, &DecompressOptions::default())
}
