//! # Oxiflate Core
//!
//! Core components for the oxiflate DEFLATE codec.
//!
//! - [`bitstream`]: LSB-first bit-level I/O
//! - [`checksum`]: CRC-32 (gzip) and Adler-32 (zlib)
//! - [`window`]: 32 KiB sliding history for back-references
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: oxiflate-cli                                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     zlib / gzip header + trailer, format detection      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZ77 match engine, Huffman coder, block codec       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, Window, CRC-32, Adler-32       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::bitstream::BitReader;
//! use oxiflate_core::checksum::{Adler32, Crc32};
//! use std::io::Cursor;
//!
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! assert_eq!(reader.read_bits(12).unwrap(), 0xDAB);
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! assert_eq!(Adler32::checksum(b"Hello"), 0x058C01F5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod checksum;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use checksum::{Adler32, Checksum, Crc32};
pub use error::{ErrorKind, FlateError, Result};
pub use window::{WINDOW_SIZE, Window};
