//! # oxiflate
//!
//! Pure Rust implementation of DEFLATE (RFC 1951) with zlib (RFC 1950) and
//! gzip (RFC 1952) framing.
//!
//! ## Features
//!
//! - **Decompression**: all DEFLATE block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - **Compression**: LZ77 with hash chains and lazy matching, then per block
//!   the cheapest of stored, fixed and dynamic Huffman coding
//! - **Containers**: zlib and gzip (header fields, multi-member), detected
//!   automatically on decompression
//! - **Bounded memory**: chunked streams, an output ceiling against
//!   decompression bombs, cooperative cancellation
//!
//! ## Example
//!
//! ```rust
//! use oxiflate::{compress, decompress};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = compress(original, 6).unwrap();
//! let decompressed = decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Streams
//!
//! ```rust
//! use oxiflate::{compress_stream, decompress_stream};
//! use std::io::Cursor;
//!
//! let input = vec![b'x'; 200_000];
//! let mut compressed = Vec::new();
//! compress_stream(Cursor::new(&input), &mut compressed, 9).unwrap();
//!
//! let mut output = Vec::new();
//! decompress_stream(Cursor::new(&compressed), &mut output).unwrap();
//! assert_eq!(output, input);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Best compression (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod container;
pub mod deflate;
pub mod gzip;
pub mod huffman;
pub mod inflate;
pub mod inspect;
pub mod lz77;
pub mod stream;
pub mod tables;
pub mod zlib;

// Re-exports
pub use adapters::{compress_file, compress_str, decompress_file, decompress_to_string};
pub use api::{compress, compress_with, decompress, decompress_with};
pub use config::{
    CancelToken, CompressOptions, CompressionLevel, DecompressOptions, MatchParams, StreamOptions,
};
pub use container::{
    Format, FrameDecoder, FrameEncoder, compression_ratio, detect, is_zlib_format,
};
pub use deflate::{BlockStats, BlockType, Deflater, deflate};
pub use gzip::GzipHeader;
pub use huffman::{HuffmanBuilder, HuffmanEncoder, HuffmanTree};
pub use inflate::{Inflater, inflate, inflate_with_limit};
pub use inspect::{StreamInfo, inspect, inspect_with_limit};
pub use lz77::{Lz77Encoder, Lz77Token};
pub use stream::{
    StreamSummary, compress_stream, compress_stream_with, decompress_stream,
    decompress_stream_with,
};
pub use zlib::{ZlibHeader, ZlibLevel};

pub use oxiflate_core::{ErrorKind, FlateError, Result};
