//! DEFLATE compression (RFC 1951).
//!
//! Input is tokenized by the LZ77 engine in segments and the tokens are cut
//! into blocks. For every block the exact bit cost of the three encodings is
//! computed and the cheapest one is written:
//!
//! - Stored blocks (raw bytes)
//! - Fixed Huffman codes
//! - Dynamic Huffman codes (table built from the block's own frequencies)
//!
//! A [`Deflater`] writes into a caller-owned [`BitWriter`], so one stream may
//! be fed across many calls without losing bit alignment or match history.

use crate::config::CompressionLevel;
use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanBuilder, HuffmanEncoder,
    LITLEN_ALPHABET_SIZE, MAX_CODE_LENGTH, MAX_CODELEN_CODE_LENGTH,
};
use crate::lz77::{Lz77Encoder, Lz77Token};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, FIXED_DISTANCE_LENGTHS, FIXED_LITLEN_LENGTHS,
    LENGTH_EXTRA_BITS, distance_to_code, fixed_distance_encoder, fixed_litlen_encoder,
    length_to_code,
};
use oxiflate_core::BitWriter;
use oxiflate_core::error::Result;
use std::io::Write;
use tracing::trace;

/// Input bytes tokenized per LZ77 pass.
const SEGMENT_SIZE: usize = 64 * 1024;

/// Tokens per Huffman block.
const MAX_BLOCK_TOKENS: usize = 16 * 1024;

/// Largest payload of one stored block.
const MAX_STORED_BLOCK: usize = 65535;

/// DEFLATE block type (the 2-bit BTYPE field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// BTYPE 00: raw bytes.
    Stored,
    /// BTYPE 01: predefined Huffman codes.
    Fixed,
    /// BTYPE 10: Huffman codes transmitted in the block header.
    Dynamic,
}

impl BlockType {
    /// The 2-bit BTYPE value.
    pub fn bits(self) -> u32 {
        match self {
            Self::Stored => 0,
            Self::Fixed => 1,
            Self::Dynamic => 2,
        }
    }
}

/// Counts of blocks written, by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Stored blocks.
    pub stored: u64,
    /// Fixed Huffman blocks.
    pub fixed: u64,
    /// Dynamic Huffman blocks.
    pub dynamic: u64,
}

impl BlockStats {
    pub(crate) fn record(&mut self, block_type: BlockType) {
        match block_type {
            BlockType::Stored => self.stored += 1,
            BlockType::Fixed => self.fixed += 1,
            BlockType::Dynamic => self.dynamic += 1,
        }
    }

    /// Total number of blocks.
    pub fn total(&self) -> u64 {
        self.stored + self.fixed + self.dynamic
    }
}

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    /// Compression level.
    level: CompressionLevel,
    /// LZ77 encoder; history persists across calls.
    lz77: Lz77Encoder,
    /// Token buffer reused between segments.
    tokens: Vec<Lz77Token>,
    /// Blocks written so far.
    stats: BlockStats,
}

impl Deflater {
    /// Create a compressor for the given level.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            lz77: Lz77Encoder::new(level.match_params()),
            tokens: Vec::new(),
            stats: BlockStats::default(),
        }
    }

    /// Blocks written so far.
    pub fn stats(&self) -> BlockStats {
        self.stats
    }

    /// Compress `data` as the next part of the stream.
    ///
    /// Set `is_final` on the last call; the last block written then carries
    /// the final-block flag. A final call with no data writes an empty final
    /// block. The writer is not padded: the container layer aligns it before
    /// writing its trailer.
    pub fn write_data<W: Write>(
        &mut self,
        writer: &mut BitWriter<W>,
        data: &[u8],
        is_final: bool,
    ) -> Result<()> {
        if data.is_empty() {
            if is_final {
                write_empty_final_block(writer)?;
                self.stats.record(BlockType::Fixed);
            }
            return Ok(());
        }

        if self.level == CompressionLevel::NONE {
            let blocks = write_stored(writer, data, is_final)?;
            self.stats.stored += blocks;
            return Ok(());
        }

        let segment_count = data.len().div_ceil(SEGMENT_SIZE);
        for (index, segment) in data.chunks(SEGMENT_SIZE).enumerate() {
            let last_segment = is_final && index + 1 == segment_count;

            let mut tokens = std::mem::take(&mut self.tokens);
            tokens.clear();
            self.lz77.compress(segment, &mut tokens);

            let mut raw_start = 0;
            let block_count = tokens.len().div_ceil(MAX_BLOCK_TOKENS);
            for (block_index, block) in tokens.chunks(MAX_BLOCK_TOKENS).enumerate() {
                let raw_len: usize = block.iter().map(Lz77Token::len).sum();
                let raw = &segment[raw_start..raw_start + raw_len];
                let final_block = last_segment && block_index + 1 == block_count;

                let block_type = write_block(writer, block, raw, final_block)?;
                self.stats.record(block_type);
                raw_start += raw_len;
            }

            self.tokens = tokens;
        }

        Ok(())
    }
}

/// Literal/length and distance symbol frequencies of one block.
#[derive(Debug, Clone)]
struct SymbolFrequencies {
    litlen: [u32; LITLEN_ALPHABET_SIZE],
    dist: [u32; DISTANCE_ALPHABET_SIZE],
}

impl SymbolFrequencies {
    fn count(tokens: &[Lz77Token]) -> Self {
        let mut litlen = [0u32; LITLEN_ALPHABET_SIZE];
        let mut dist = [0u32; DISTANCE_ALPHABET_SIZE];

        for token in tokens {
            match *token {
                Lz77Token::Literal(byte) => litlen[byte as usize] += 1,
                Lz77Token::Match { length, distance } => {
                    litlen[length_to_code(length).0 as usize] += 1;
                    dist[distance_to_code(distance).0 as usize] += 1;
                }
            }
        }
        litlen[END_OF_BLOCK as usize] += 1;

        Self { litlen, dist }
    }

    /// Extra bits carried by length and distance symbols.
    fn extra_bits(&self) -> u64 {
        let length_extra: u64 = self.litlen[257..]
            .iter()
            .zip(LENGTH_EXTRA_BITS.iter())
            .map(|(&f, &e)| f as u64 * e as u64)
            .sum();
        let dist_extra: u64 = self
            .dist
            .iter()
            .zip(DISTANCE_EXTRA_BITS.iter())
            .map(|(&f, &e)| f as u64 * e as u64)
            .sum();
        length_extra + dist_extra
    }

    /// Bits for all symbols of the block under the given code lengths.
    fn coded_bits(&self, litlen_lengths: &[u8], dist_lengths: &[u8]) -> u64 {
        let litlen: u64 = self
            .litlen
            .iter()
            .zip(litlen_lengths)
            .map(|(&f, &l)| f as u64 * l as u64)
            .sum();
        let dist: u64 = self
            .dist
            .iter()
            .zip(dist_lengths)
            .map(|(&f, &l)| f as u64 * l as u64)
            .sum();
        litlen + dist + self.extra_bits()
    }
}

/// One code-length-alphabet symbol of a dynamic block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodeLengthSymbol {
    symbol: u8,
    extra_bits: u8,
    extra: u8,
}

impl CodeLengthSymbol {
    fn plain(symbol: u8) -> Self {
        Self {
            symbol,
            extra_bits: 0,
            extra: 0,
        }
    }
}

/// Run-length encode a code length sequence with symbols 16, 17 and 18.
fn rle_code_lengths(lengths: &[u8]) -> Vec<CodeLengthSymbol> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut left = run;

        if len == 0 {
            while left >= 11 {
                let n = left.min(138);
                out.push(CodeLengthSymbol {
                    symbol: 18,
                    extra_bits: 7,
                    extra: (n - 11) as u8,
                });
                left -= n;
            }
            if left >= 3 {
                out.push(CodeLengthSymbol {
                    symbol: 17,
                    extra_bits: 3,
                    extra: (left - 3) as u8,
                });
                left = 0;
            }
        } else {
            out.push(CodeLengthSymbol::plain(len));
            left -= 1;
            while left >= 3 {
                let n = left.min(6);
                out.push(CodeLengthSymbol {
                    symbol: 16,
                    extra_bits: 2,
                    extra: (n - 3) as u8,
                });
                left -= n;
            }
        }

        out.extend(std::iter::repeat_n(CodeLengthSymbol::plain(len), left));
        i += run;
    }

    out
}

/// Number of leading entries to transmit: through the last non-zero one,
/// but at least `min`.
fn used_prefix(lengths: &[u8], min: usize) -> usize {
    lengths
        .iter()
        .rposition(|&l| l != 0)
        .map_or(0, |p| p + 1)
        .max(min)
}

/// Everything needed to write a dynamic Huffman block header.
#[derive(Debug, Clone)]
struct DynamicHeader {
    litlen_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    /// Literal/length codes transmitted (257-286).
    hlit: usize,
    /// Distance codes transmitted (1-30).
    hdist: usize,
    codelen_lengths: Vec<u8>,
    /// Code length codes transmitted (4-19).
    hclen: usize,
    rle: Vec<CodeLengthSymbol>,
}

impl DynamicHeader {
    fn build(freqs: &SymbolFrequencies) -> Self {
        let litlen_lengths =
            HuffmanBuilder::from_frequencies(&freqs.litlen, MAX_CODE_LENGTH as u8).build_lengths();
        let dist_lengths =
            HuffmanBuilder::from_frequencies(&freqs.dist, MAX_CODE_LENGTH as u8).build_lengths();

        let hlit = used_prefix(&litlen_lengths, 257);
        let hdist = used_prefix(&dist_lengths, 1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let rle = rle_code_lengths(&combined);

        let mut codelen_builder =
            HuffmanBuilder::new(CODELEN_ALPHABET_SIZE, MAX_CODELEN_CODE_LENGTH as u8);
        for item in &rle {
            codelen_builder.add(item.symbol as u16);
        }
        let codelen_lengths = codelen_builder.build_lengths();

        let ordered: Vec<u8> = CODE_LENGTH_ORDER
            .iter()
            .map(|&s| codelen_lengths[s])
            .collect();
        let hclen = used_prefix(&ordered, 4);

        Self {
            litlen_lengths,
            dist_lengths,
            hlit,
            hdist,
            codelen_lengths,
            hclen,
            rle,
        }
    }

    /// Header size in bits, excluding the 3-bit block header.
    fn bits(&self) -> u64 {
        let rle_bits: u64 = self
            .rle
            .iter()
            .map(|item| {
                self.codelen_lengths[item.symbol as usize] as u64 + item.extra_bits as u64
            })
            .sum();
        5 + 5 + 4 + 3 * self.hclen as u64 + rle_bits
    }

    fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<HuffmanEncoder> {
        writer.write_bits((self.hlit - 257) as u32, 5)?;
        writer.write_bits((self.hdist - 1) as u32, 5)?;
        writer.write_bits((self.hclen - 4) as u32, 4)?;

        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write_bits(self.codelen_lengths[symbol] as u32, 3)?;
        }

        let codelen_encoder = HuffmanEncoder::from_lengths(&self.codelen_lengths)?;
        for item in &self.rle {
            codelen_encoder.write_symbol(writer, item.symbol as u16)?;
            writer.write_bits(item.extra as u32, item.extra_bits)?;
        }

        HuffmanEncoder::from_lengths(&self.litlen_lengths)
    }
}

/// Bits taken by stored blocks holding `len` bytes, starting at bit offset
/// `bit_pos` of the output.
fn stored_bits(len: usize, bit_pos: u64) -> u64 {
    let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    let first_pad = (8 - (bit_pos + 3) % 8) % 8;
    // Later blocks start byte-aligned: 3 header bits pad out to 8.
    (3 + first_pad + 32) + (blocks - 1) * (8 + 32) + 8 * len as u64
}

/// Write one block in the cheapest encoding and report which was used.
fn write_block<W: Write>(
    writer: &mut BitWriter<W>,
    tokens: &[Lz77Token],
    raw: &[u8],
    is_final: bool,
) -> Result<BlockType> {
    let freqs = SymbolFrequencies::count(tokens);

    let fixed_cost = 3 + freqs.coded_bits(&FIXED_LITLEN_LENGTHS, &FIXED_DISTANCE_LENGTHS);
    let header = DynamicHeader::build(&freqs);
    let dynamic_cost =
        3 + header.bits() + freqs.coded_bits(&header.litlen_lengths, &header.dist_lengths);
    let stored_cost = stored_bits(raw.len(), writer.bits_written());

    let (block_type, cost) = if dynamic_cost < fixed_cost {
        (BlockType::Dynamic, dynamic_cost)
    } else {
        (BlockType::Fixed, fixed_cost)
    };
    let (block_type, cost) = if stored_cost <= cost {
        (BlockType::Stored, stored_cost)
    } else {
        (block_type, cost)
    };

    trace!(
        ?block_type,
        tokens = tokens.len(),
        raw_len = raw.len(),
        bits = cost,
        fixed_cost,
        dynamic_cost,
        stored_cost,
        is_final,
        "deflate block"
    );

    match block_type {
        BlockType::Stored => {
            write_stored(writer, raw, is_final)?;
        }
        BlockType::Fixed => {
            write_block_header(writer, is_final, BlockType::Fixed)?;
            write_tokens(
                writer,
                tokens,
                fixed_litlen_encoder()?,
                fixed_distance_encoder()?,
            )?;
        }
        BlockType::Dynamic => {
            write_block_header(writer, is_final, BlockType::Dynamic)?;
            let litlen = header.write(writer)?;
            let dist = HuffmanEncoder::from_lengths(&header.dist_lengths)?;
            write_tokens(writer, tokens, &litlen, &dist)?;
        }
    }

    Ok(block_type)
}

fn write_block_header<W: Write>(
    writer: &mut BitWriter<W>,
    is_final: bool,
    block_type: BlockType,
) -> Result<()> {
    writer.write_bit(is_final)?;
    writer.write_bits(block_type.bits(), 2)
}

/// Write tokens followed by the end-of-block code.
fn write_tokens<W: Write>(
    writer: &mut BitWriter<W>,
    tokens: &[Lz77Token],
    litlen: &HuffmanEncoder,
    dist: &HuffmanEncoder,
) -> Result<()> {
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => litlen.write_symbol(writer, byte as u16)?,
            Lz77Token::Match { length, distance } => {
                let (code, extra_bits, extra) = length_to_code(length);
                litlen.write_symbol(writer, code)?;
                writer.write_bits(extra as u32, extra_bits)?;

                let (code, extra_bits, extra) = distance_to_code(distance);
                dist.write_symbol(writer, code)?;
                writer.write_bits(extra as u32, extra_bits)?;
            }
        }
    }
    litlen.write_symbol(writer, END_OF_BLOCK)
}

/// Write `data` as stored blocks; returns the number of blocks.
fn write_stored<W: Write>(writer: &mut BitWriter<W>, data: &[u8], is_final: bool) -> Result<u64> {
    if data.is_empty() {
        write_stored_block(writer, &[], is_final)?;
        return Ok(1);
    }

    let count = data.len().div_ceil(MAX_STORED_BLOCK);
    for (index, chunk) in data.chunks(MAX_STORED_BLOCK).enumerate() {
        write_stored_block(writer, chunk, is_final && index + 1 == count)?;
    }
    Ok(count as u64)
}

fn write_stored_block<W: Write>(
    writer: &mut BitWriter<W>,
    chunk: &[u8],
    is_final: bool,
) -> Result<()> {
    write_block_header(writer, is_final, BlockType::Stored)?;
    writer.align_to_byte()?;

    let len = chunk.len() as u16;
    writer.write_bits(len as u32, 16)?;
    writer.write_bits(!len as u32, 16)?;
    writer.write_bytes(chunk)
}

/// A final fixed-Huffman block holding only the end-of-block code.
fn write_empty_final_block<W: Write>(writer: &mut BitWriter<W>) -> Result<()> {
    write_block_header(writer, true, BlockType::Fixed)?;
    fixed_litlen_encoder()?.write_symbol(writer, END_OF_BLOCK)
}

/// Compress data to a raw DEFLATE stream (no container).
///
/// # Example
///
/// ```
/// use oxiflate::{CompressionLevel, deflate, inflate};
///
/// let data = b"Hello, World! Hello, World!";
/// let compressed = deflate(data, CompressionLevel::DEFAULT).unwrap();
/// assert_eq!(inflate(&compressed).unwrap(), data);
/// ```
pub fn deflate(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level);
    let mut writer = BitWriter::new(Vec::with_capacity(data.len() / 2 + 64));
    deflater.write_data(&mut writer, data, true)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::inflate;

    fn level(n: i32) -> CompressionLevel {
        CompressionLevel::new(n).unwrap()
    }

    fn pseudo_random(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                (state >> 33) as u8
            })
            .collect()
    }

    #[test]
    fn test_deflate_stored() {
        let input = b"Hello, World!";
        let compressed = deflate(input, CompressionLevel::NONE).unwrap();
        // 1 header byte, LEN, NLEN, payload
        assert_eq!(compressed.len(), 1 + 4 + input.len());
        assert_eq!(compressed[0], 0x01);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_empty() {
        for n in [0, 1, 6, 9] {
            let compressed = deflate(b"", level(n)).unwrap();
            assert_eq!(compressed, vec![0x03, 0x00]);
            assert!(inflate(&compressed).unwrap().is_empty());
        }
    }

    #[test]
    fn test_deflate_compressed() {
        let input = b"AAAAAAAAAABBBBBBBBBBCCCCCCCCCC";
        let compressed = deflate(input, CompressionLevel::DEFAULT).unwrap();
        assert!(compressed.len() < input.len());
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_roundtrip() {
        let inputs = [
            b"a".to_vec(),
            b"Hello".to_vec(),
            b"The quick brown fox jumps over the lazy dog".to_vec(),
            vec![0u8; 1000],
            (0..=255).collect::<Vec<u8>>(),
            pseudo_random(5000, 7),
        ];

        for input in &inputs {
            for n in 0..=9 {
                let compressed = deflate(input, level(n)).unwrap();
                let decompressed = inflate(&compressed).unwrap();
                assert_eq!(
                    &decompressed,
                    input,
                    "Roundtrip failed for level {} with {} bytes",
                    n,
                    input.len()
                );
            }
        }
    }

    #[test]
    fn test_incompressible_falls_back_to_stored() {
        let input = pseudo_random(10_000, 42);
        let mut deflater = Deflater::new(CompressionLevel::BEST);
        let mut writer = BitWriter::new(Vec::new());
        deflater.write_data(&mut writer, &input, true).unwrap();
        let compressed = writer.finish().unwrap();

        assert_eq!(deflater.stats().stored, 1);
        assert!(compressed.len() <= input.len() + 5);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_dynamic_chosen_for_text() {
        let text = b"It was the best of times, it was the worst of times, it was the age of \
                     wisdom, it was the age of foolishness, it was the epoch of belief. ";
        let mut input = Vec::new();
        for i in 0..50 {
            input.extend_from_slice(text);
            input.extend_from_slice(format!("{} ", i * 7919).as_bytes());
        }

        let mut deflater = Deflater::new(CompressionLevel::DEFAULT);
        let mut writer = BitWriter::new(Vec::new());
        deflater.write_data(&mut writer, &input, true).unwrap();
        let compressed = writer.finish().unwrap();

        assert!(deflater.stats().dynamic >= 1);
        assert!(compressed.len() < input.len() / 4);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_short_input_uses_fixed() {
        let mut deflater = Deflater::new(CompressionLevel::DEFAULT);
        let mut writer = BitWriter::new(Vec::new());
        deflater.write_data(&mut writer, b"abcabcabcabc", true).unwrap();
        assert_eq!(deflater.stats().fixed, 1);
        assert_eq!(deflater.stats().total(), 1);
    }

    #[test]
    fn test_multiple_calls_share_stream() {
        let part = b"repeat me, repeat me, repeat me! ".repeat(20);
        let mut deflater = Deflater::new(CompressionLevel::DEFAULT);
        let mut writer = BitWriter::new(Vec::new());
        deflater.write_data(&mut writer, &part, false).unwrap();
        deflater.write_data(&mut writer, &part, false).unwrap();
        deflater.write_data(&mut writer, &[], true).unwrap();
        let compressed = writer.finish().unwrap();

        let mut expected = part.clone();
        expected.extend_from_slice(&part);
        assert_eq!(inflate(&compressed).unwrap(), expected);
    }

    #[test]
    fn test_large_input_multiple_blocks() {
        let mut input = Vec::new();
        for i in 0..40_000u32 {
            input.extend_from_slice(format!("line {} of the log\n", i % 1000).as_bytes());
        }
        for n in [0, 1, 6, 9] {
            let mut deflater = Deflater::new(level(n));
            let mut writer = BitWriter::new(Vec::new());
            deflater.write_data(&mut writer, &input, true).unwrap();
            let compressed = writer.finish().unwrap();
            assert!(deflater.stats().total() > 1, "level {}", n);
            assert_eq!(inflate(&compressed).unwrap(), input, "level {}", n);
        }
    }

    #[test]
    fn test_rle_code_lengths() {
        let lengths = [0u8; 20];
        let rle = rle_code_lengths(&lengths);
        assert_eq!(
            rle,
            vec![CodeLengthSymbol {
                symbol: 18,
                extra_bits: 7,
                extra: 9
            }]
        );

        let lengths = [8u8, 8, 8, 8, 8, 0, 0, 5];
        let rle = rle_code_lengths(&lengths);
        assert_eq!(
            rle,
            vec![
                CodeLengthSymbol::plain(8),
                CodeLengthSymbol {
                    symbol: 16,
                    extra_bits: 2,
                    extra: 1
                },
                CodeLengthSymbol::plain(0),
                CodeLengthSymbol::plain(0),
                CodeLengthSymbol::plain(5),
            ]
        );

        // 140 zeros: 138 via symbol 18, then two plain zeros.
        let rle = rle_code_lengths(&[0u8; 140]);
        assert_eq!(rle.len(), 3);
        assert_eq!(rle[0].symbol, 18);
        assert_eq!(rle[0].extra, 127);
    }

    #[test]
    fn test_stored_bits() {
        // Aligned start: 3 header bits + 5 pad + LEN/NLEN + payload.
        assert_eq!(stored_bits(10, 0), 8 + 32 + 80);
        // Header ends exactly on a byte boundary: no padding.
        assert_eq!(stored_bits(0, 5), 35);
        assert_eq!(stored_bits(65536, 0), 40 + 40 + 8 * 65536);
    }

    #[test]
    fn test_level_comparison() {
        let input = vec![b'A'; 1000];
        let stored = deflate(&input, CompressionLevel::NONE).unwrap();
        let fast = deflate(&input, CompressionLevel::FAST).unwrap();
        let best = deflate(&input, CompressionLevel::BEST).unwrap();
        assert!(fast.len() < stored.len());
        assert!(best.len() <= fast.len());
        assert_eq!(inflate(&best).unwrap(), input);
    }
}
