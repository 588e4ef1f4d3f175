//! One-shot compression and decompression of byte buffers.

use crate::config::{CompressOptions, CompressionLevel, DecompressOptions};
use crate::container::{Format, FrameDecoder, detect, encode_frame};
use oxiflate_core::error::{FlateError, Result};
use tracing::debug;

/// Smallest first-attempt output room for one-shot decoding.
const MIN_INITIAL_ROOM: u64 = 4096;

/// Compress `data` to a zlib stream.
///
/// `level` must be 0-9. Empty input yields empty output.
///
/// # Example
///
/// ```
/// use oxiflate::{compress, decompress, is_zlib_format};
///
/// let compressed = compress(b"Hello, World! Hello, World!", 6).unwrap();
/// assert!(is_zlib_format(&compressed));
/// assert_eq!(decompress(&compressed).unwrap(), b"Hello, World! Hello, World!");
/// ```
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    let level = CompressionLevel::new(level)?;
    compress_with(data, &CompressOptions::new(level))
}

/// Compress `data` with explicit options. Empty input yields empty output.
pub fn compress_with(data: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    encode_frame(data, options)
}

/// Decompress a zlib or gzip stream, detecting the format from its header.
///
/// Empty input yields empty output. Output is capped at the default
/// ceiling of [`DecompressOptions`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with(data, &DecompressOptions::default())
}

/// Decompress with an explicit output-growth policy.
pub fn decompress_with(data: &[u8], options: &DecompressOptions) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let format = detect(data).ok_or_else(|| FlateError::unrecognized_format(data))?;
    decode_with(data, format, options)
}

/// Decode a known format, growing the output room until the stream fits or
/// the ceiling is reached.
pub(crate) fn decode_with(
    data: &[u8],
    format: Format,
    options: &DecompressOptions,
) -> Result<Vec<u8>> {
    options.validate()?;

    let mut room = (data.len() as u64)
        .saturating_mul(options.initial_ratio)
        .max(MIN_INITIAL_ROOM)
        .min(options.max_output);

    loop {
        let mut output = Vec::with_capacity(room as usize);
        match FrameDecoder::new(format)
            .limit(Some(room))
            .decode(data, &mut output)
        {
            Ok(_) => return Ok(output),
            Err(FlateError::OutputTooLarge { .. }) if room < options.max_output => {
                let grown = room.saturating_mul(options.growth_percent) / 100;
                room = grown.max(room + 1).min(options.max_output);
                debug!(room, format = %format, "output room exhausted, retrying");
            }
            Err(FlateError::OutputTooLarge { .. }) => {
                return Err(FlateError::output_too_large(options.max_output));
            }
            Err(err) => return Err(err),
        }
    }
}
