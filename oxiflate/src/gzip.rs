//! Gzip format wrapper for DEFLATE compression.
//!
//! A gzip file (RFC 1952) is one or more members, each laid out as:
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+
//! |ID1|ID2|CM |FLG|     MTIME     |XFL|OS |
//! +---+---+---+---+---+---+---+---+---+---+
//! (optional FEXTRA, FNAME, FCOMMENT, FHCRC fields)
//! +=======================+
//! |  compressed blocks    |
//! +=======================+
//! +---+---+---+---+---+---+---+---+
//! |     CRC32     |     ISIZE     |
//! +---+---+---+---+---+---+---+---+
//! ```
//!
//! CRC32 and ISIZE are little-endian; ISIZE is the uncompressed size
//! modulo 2^32.

use crate::config::{CompressOptions, CompressionLevel, DecompressOptions};
use crate::container::Format;
use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::{BitReader, Crc32};
use std::io::Read;

/// Gzip magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// CM value for DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Length of the CRC32 + ISIZE trailer.
pub const TRAILER_SIZE: usize = 8;

/// OS byte for Unix.
pub const OS_UNIX: u8 = 3;

/// OS byte when the OS is unknown.
pub const OS_UNKNOWN: u8 = 255;

/// FLG bits.
pub mod flags {
    /// Payload is probably text.
    pub const FTEXT: u8 = 0x01;
    /// CRC16 of the header follows the optional fields.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Zero-terminated original filename present.
    pub const FNAME: u8 = 0x08;
    /// Zero-terminated comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Bits that must be zero.
    pub const RESERVED: u8 = 0xE0;
}

/// Header fields of one gzip member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// FTEXT hint.
    pub text: bool,
    /// Modification time of the original file (Unix seconds, 0 = unknown).
    pub mtime: u32,
    /// Extra field payload.
    pub extra: Option<Vec<u8>>,
    /// Original filename.
    pub filename: Option<String>,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Operating system byte.
    pub os: u8,
    /// Emit (or, when parsed, whether the member carried) a header CRC16.
    pub header_crc: bool,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            text: false,
            mtime: 0,
            extra: None,
            filename: None,
            comment: None,
            os: OS_UNKNOWN,
            header_crc: false,
        }
    }
}

impl GzipHeader {
    /// Empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the original filename.
    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    /// Set the comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the modification time.
    pub fn mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Set the extra field.
    pub fn extra(mut self, extra: Vec<u8>) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Set the OS byte.
    pub fn os(mut self, os: u8) -> Self {
        self.os = os;
        self
    }

    /// Request a header CRC16.
    pub fn with_header_crc(mut self) -> Self {
        self.header_crc = true;
        self
    }

    /// FLG byte for these fields.
    pub fn flags(&self) -> u8 {
        let mut flg = 0;
        if self.text {
            flg |= flags::FTEXT;
        }
        if self.header_crc {
            flg |= flags::FHCRC;
        }
        if self.extra.is_some() {
            flg |= flags::FEXTRA;
        }
        if self.filename.is_some() {
            flg |= flags::FNAME;
        }
        if self.comment.is_some() {
            flg |= flags::FCOMMENT;
        }
        flg
    }

    /// Serialize the header for a member compressed at `level`.
    pub fn encode(&self, level: CompressionLevel) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&GZIP_MAGIC);
        out.push(CM_DEFLATE);
        out.push(self.flags());
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(xfl_for_level(level));
        out.push(self.os);

        if let Some(extra) = &self.extra {
            let len = u16::try_from(extra.len()).map_err(|_| {
                FlateError::invalid_header(format!(
                    "gzip extra field too long: {} bytes",
                    extra.len()
                ))
            })?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(extra);
        }
        if let Some(name) = &self.filename {
            push_zero_terminated(&mut out, "filename", name)?;
        }
        if let Some(comment) = &self.comment {
            push_zero_terminated(&mut out, "comment", comment)?;
        }
        if self.header_crc {
            let crc16 = (Crc32::compute(&out) & 0xFFFF) as u16;
            out.extend_from_slice(&crc16.to_le_bytes());
        }

        Ok(out)
    }

    /// Read a complete header, magic included.
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let mut magic = [0u8; 2];
        reader.read_bytes(&mut magic)?;
        if magic != GZIP_MAGIC {
            return Err(FlateError::invalid_header(format!(
                "bad gzip magic {:02x} {:02x}",
                magic[0], magic[1]
            )));
        }
        Self::read_after_magic(reader)
    }

    /// Read the header fields that follow the two magic bytes.
    pub fn read_after_magic<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let mut raw = GZIP_MAGIC.to_vec();

        let mut fixed = [0u8; 8];
        reader.read_bytes(&mut fixed)?;
        raw.extend_from_slice(&fixed);

        let [cm, flg, m0, m1, m2, m3, _xfl, os] = fixed;
        if cm != CM_DEFLATE {
            return Err(FlateError::invalid_header(format!(
                "unsupported gzip compression method {}",
                cm
            )));
        }
        if flg & flags::RESERVED != 0 {
            return Err(FlateError::invalid_header(format!(
                "reserved gzip flags set: {:#04x}",
                flg
            )));
        }

        let mut header = Self {
            text: flg & flags::FTEXT != 0,
            mtime: u32::from_le_bytes([m0, m1, m2, m3]),
            os,
            header_crc: flg & flags::FHCRC != 0,
            ..Self::default()
        };

        if flg & flags::FEXTRA != 0 {
            let mut len = [0u8; 2];
            reader.read_bytes(&mut len)?;
            raw.extend_from_slice(&len);

            let mut extra = vec![0u8; u16::from_le_bytes(len) as usize];
            reader.read_bytes(&mut extra)?;
            raw.extend_from_slice(&extra);
            header.extra = Some(extra);
        }
        if flg & flags::FNAME != 0 {
            header.filename = Some(read_zero_terminated(reader, &mut raw)?);
        }
        if flg & flags::FCOMMENT != 0 {
            header.comment = Some(read_zero_terminated(reader, &mut raw)?);
        }
        if header.header_crc {
            let mut stored = [0u8; 2];
            reader.read_bytes(&mut stored)?;
            let expected = u16::from_le_bytes(stored);
            let computed = (Crc32::compute(&raw) & 0xFFFF) as u16;
            if expected != computed {
                return Err(FlateError::checksum_mismatch(
                    u32::from(expected),
                    u32::from(computed),
                ));
            }
        }

        Ok(header)
    }
}

/// XFL byte: 2 for maximum compression, 4 for fastest.
fn xfl_for_level(level: CompressionLevel) -> u8 {
    match level.value() {
        9 => 2,
        1 => 4,
        _ => 0,
    }
}

fn push_zero_terminated(out: &mut Vec<u8>, field: &str, value: &str) -> Result<()> {
    if value.as_bytes().contains(&0) {
        return Err(FlateError::invalid_header(format!(
            "gzip {} contains a NUL byte",
            field
        )));
    }
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    Ok(())
}

fn read_zero_terminated<R: Read>(reader: &mut BitReader<R>, raw: &mut Vec<u8>) -> Result<String> {
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_bytes(&mut byte)?;
        raw.push(byte[0]);
        if byte[0] == 0 {
            break;
        }
        bytes.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Compress data as a single gzip member with a default header.
///
/// # Example
///
/// ```
/// use oxiflate::CompressionLevel;
/// use oxiflate::gzip::{compress_gzip, decompress_gzip};
///
/// let compressed = compress_gzip(b"gzip me", CompressionLevel::DEFAULT).unwrap();
/// assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
/// assert_eq!(decompress_gzip(&compressed).unwrap(), b"gzip me");
/// ```
pub fn compress_gzip(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let options = CompressOptions::new(level).format(Format::Gzip);
    crate::container::encode_frame(input, &options)
}

/// Decompress gzip data; concatenated members decode to the concatenation
/// of their payloads.
pub fn decompress_gzip(input: &[u8]) -> Result<Vec<u8>> {
    crate::api::decode_with(input, Format::Gzip, &DecompressOptions::default())
}
