//! Configuration for compression, decompression and streaming.
//!
//! Every knob the codec exposes lives here: the compression level and the
//! match-search effort derived from it, the container options for encoding,
//! the bounded output-growth policy for one-shot decoding, and the chunking
//! and cancellation settings for streams.

use crate::container::Format;
use crate::gzip::GzipHeader;
use oxiflate_core::WINDOW_SIZE;
use oxiflate_core::error::{FlateError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default chunk size for streaming operations (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default ceiling for one-shot decompression (100 MiB).
pub const DEFAULT_MAX_OUTPUT: u64 = 100 * 1024 * 1024;

/// Compression level (0-9).
///
/// - Level 0: No compression (stored blocks)
/// - Level 1-3: Fast compression
/// - Level 4-6: Balanced (default is 6)
/// - Level 7-9: Best compression (slower)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Store only, no matching.
    pub const NONE: Self = Self(0);
    /// Fastest matching.
    pub const FAST: Self = Self(1);
    /// Balanced default.
    pub const DEFAULT: Self = Self(6);
    /// Exhaustive search.
    pub const BEST: Self = Self(9);

    /// Validate a level; anything outside 0-9 is rejected.
    pub fn new(level: i32) -> Result<Self> {
        if (0..=9).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(FlateError::invalid_level(level))
        }
    }

    /// Numeric value (0-9).
    pub fn value(self) -> u8 {
        self.0
    }

    /// Match search parameters for this level.
    pub fn match_params(self) -> MatchParams {
        MatchParams::for_level(self)
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = FlateError;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

impl std::fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Effort limits for the LZ77 match search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchParams {
    /// Hash chain candidates examined per position (0 disables matching).
    pub max_chain: usize,
    /// Stop searching once a match this long is found; matches at least this
    /// long are also emitted without a lazy look-ahead.
    pub nice_length: usize,
    /// Defer a match by one byte when the next position matches longer.
    pub lazy: bool,
}

impl MatchParams {
    /// Parameters for a compression level.
    ///
    /// Level 9 walks each chain to the edge of the 32 KiB window.
    pub fn for_level(level: CompressionLevel) -> Self {
        let (max_chain, nice_length, lazy) = match level.value() {
            0 => (0, 0, false),
            1 => (4, 8, false),
            2 => (8, 16, false),
            3 => (16, 32, false),
            4 => (32, 16, true),
            5 => (32, 32, true),
            6 => (128, 128, true),
            7 => (256, 128, true),
            8 => (1024, 258, true),
            _ => (WINDOW_SIZE, 258, true),
        };

        Self {
            max_chain,
            nice_length,
            lazy,
        }
    }
}

/// Options for encoding.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Compression level.
    pub level: CompressionLevel,
    /// Container format.
    pub format: Format,
    /// Header fields written when `format` is gzip.
    pub gzip_header: GzipHeader,
}

impl CompressOptions {
    /// zlib output at the given level.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Set the compression level.
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the container format.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Use gzip framing with the given header.
    pub fn gzip_header(mut self, header: GzipHeader) -> Self {
        self.format = Format::Gzip;
        self.gzip_header = header;
        self
    }
}

/// Output-buffer growth policy for one-shot decompression.
///
/// Decoding starts with room for `initial_ratio` times the compressed size
/// and, whenever that is not enough, retries with `growth_percent` of the
/// previous room, up to `max_output` bytes. Past the ceiling the call fails
/// with [`FlateError::OutputTooLarge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressOptions {
    /// First attempt's output room, as a multiple of the compressed size.
    pub initial_ratio: u64,
    /// Room of each retry relative to the previous attempt, in percent.
    pub growth_percent: u64,
    /// Hard ceiling on decompressed output.
    pub max_output: u64,
}

impl Default for DecompressOptions {
    fn default() -> Self {
        Self {
            initial_ratio: 2,
            growth_percent: 150,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }
}

impl DecompressOptions {
    /// Set the output ceiling.
    pub fn max_output(mut self, max_output: u64) -> Self {
        self.max_output = max_output;
        self
    }

    /// Set the initial output ratio.
    pub fn initial_ratio(mut self, ratio: u64) -> Self {
        self.initial_ratio = ratio;
        self
    }

    /// Set the growth per retry.
    pub fn growth_percent(mut self, percent: u64) -> Self {
        self.growth_percent = percent;
        self
    }

    /// Reject settings that would never terminate or never succeed.
    pub fn validate(&self) -> Result<()> {
        if self.initial_ratio == 0 {
            return Err(FlateError::invalid_config("initial_ratio must be at least 1"));
        }
        if self.growth_percent <= 100 {
            return Err(FlateError::invalid_config(format!(
                "growth_percent must exceed 100, got {}",
                self.growth_percent
            )));
        }
        if self.max_output == 0 {
            return Err(FlateError::invalid_config("max_output must be non-zero"));
        }
        Ok(())
    }
}

/// Cooperative cancellation signal shared between a stream operation and
/// whoever wants to stop it.
///
/// Stream operations check the token between chunks; once cancelled they
/// return [`FlateError::Cancelled`] and leave the output truncated.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fail with [`FlateError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(FlateError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Options for the chunked stream operations.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Bytes read (compression) or produced (decompression) per chunk.
    pub chunk_size: usize,
    /// Optional ceiling on decompressed output.
    pub max_output: Option<u64>,
    /// Optional cancellation token, checked between chunks.
    pub cancel: Option<CancelToken>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_output: None,
            cancel: None,
        }
    }
}

impl StreamOptions {
    /// Set the chunk size.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set an output ceiling for decompression.
    pub fn max_output(mut self, max_output: u64) -> Self {
        self.max_output = Some(max_output);
        self
    }

    /// Attach a cancellation token.
    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Reject a zero chunk size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FlateError::invalid_config("chunk_size must be non-zero"));
        }
        Ok(())
    }

    pub(crate) fn check_cancel(&self) -> Result<()> {
        match &self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }
}
