//! Canonical Huffman coding for DEFLATE.
//!
//! DEFLATE never transmits codes, only code lengths. Codes are derived with
//! the canonical rule of RFC 1951 Section 3.2.2: shorter codes first, and
//! within one length, consecutive values in ascending symbol order.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29
//! - **Code Length**: 0-18 (for transmitting dynamic tables)
//!
//! [`HuffmanTree`] decodes, [`HuffmanEncoder`] encodes, and [`HuffmanBuilder`]
//! turns symbol frequencies into length-limited code lengths.

use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::{BitReader, BitWriter};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Maximum code length for the code length alphabet (7 bits).
pub const MAX_CODELEN_CODE_LENGTH: usize = 7;

/// Number of literal/length symbols that may appear in a block (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Number of distance symbols that may appear in a block (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Assign canonical codes to a code length table.
///
/// Returns the code of each symbol in natural (MSB-first) bit order; unused
/// symbols get 0. Fails if a length exceeds 15 or the lengths over-subscribe
/// the code space.
pub fn canonical_codes(code_lengths: &[u8]) -> Result<Vec<u16>> {
    let bl_count = count_lengths(code_lengths)?;

    let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LENGTH {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    let mut codes = vec![0u16; code_lengths.len()];
    for (symbol, &len) in code_lengths.iter().enumerate() {
        if len > 0 {
            codes[symbol] = next_code[len as usize] as u16;
            next_code[len as usize] += 1;
        }
    }

    Ok(codes)
}

/// Count codes per length, rejecting over-subscribed tables.
///
/// Incomplete tables are accepted; bit patterns left unassigned decode as
/// [`FlateError::InvalidHuffmanCode`].
fn count_lengths(code_lengths: &[u8]) -> Result<[u32; MAX_CODE_LENGTH + 1]> {
    let mut bl_count = [0u32; MAX_CODE_LENGTH + 1];
    for &len in code_lengths {
        if len as usize > MAX_CODE_LENGTH {
            return Err(FlateError::corrupted(
                0,
                format!("code length {} exceeds maximum {}", len, MAX_CODE_LENGTH),
            ));
        }
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }

    // Remaining code space after each length; negative means over-subscribed.
    let mut left: i64 = 1;
    for &count in &bl_count[1..] {
        left = (left << 1) - count as i64;
        if left < 0 {
            return Err(FlateError::corrupted(0, "over-subscribed Huffman code"));
        }
    }

    Ok(bl_count)
}

/// Reverse the low `length` bits of `code`.
#[inline]
pub fn reverse_bits(code: u16, length: u8) -> u16 {
    if length == 0 {
        return 0;
    }
    code.reverse_bits() >> (16 - length as u32)
}

/// A Huffman table for decoding.
///
/// Codes up to `FAST_BITS` long resolve with a single table lookup on the
/// peeked bits. Longer codes (and the tail of the stream, where fewer than
/// `FAST_BITS` bits may remain) take the bit-at-a-time canonical walk.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Direct lookup indexed by the next `fast_bits` bits: (symbol, length).
    /// Length 0 means the code is longer than `fast_bits` or unassigned.
    fast_table: Vec<(u16, u8)>,
    /// Number of bits for fast lookup.
    fast_bits: u8,
    /// Maximum code length in this tree.
    max_code_length: u8,
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols ordered by (length, symbol).
    symbols: Vec<u16>,
}

impl HuffmanTree {
    /// Number of bits for the fast lookup table.
    const FAST_BITS: u8 = 9;

    /// Build a decoding tree from code lengths.
    ///
    /// `code_lengths[i]` is the bit length for symbol `i`; 0 means unused.
    /// An all-zero table builds a tree on which every decode fails.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let bl_count = count_lengths(code_lengths)?;
        let max_length = code_lengths.iter().copied().max().unwrap_or(0);

        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        for (count, &bl) in counts.iter_mut().zip(bl_count.iter()) {
            *count = bl as u16;
        }

        // Symbols sorted by length, then symbol value.
        let mut offsets = [0usize; MAX_CODE_LENGTH + 2];
        for len in 1..=MAX_CODE_LENGTH {
            offsets[len + 1] = offsets[len] + counts[len] as usize;
        }
        let mut symbols = vec![0u16; offsets[MAX_CODE_LENGTH + 1]];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                symbols[offsets[len as usize]] = symbol as u16;
                offsets[len as usize] += 1;
            }
        }

        let fast_bits = Self::FAST_BITS.min(max_length.max(1));
        let mut fast_table = vec![(0u16, 0u8); 1 << fast_bits];
        let codes = canonical_codes(code_lengths)?;
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len == 0 || len > fast_bits {
                continue;
            }
            let reversed = reverse_bits(codes[symbol], len) as usize;
            let step = 1usize << len;
            let mut index = reversed;
            while index < fast_table.len() {
                fast_table[index] = (symbol as u16, len);
                index += step;
            }
        }

        Ok(Self {
            fast_table,
            fast_bits,
            max_code_length: max_length,
            counts,
            symbols,
        })
    }

    /// Longest code length in the table (0 for an empty table).
    pub fn max_code_length(&self) -> u8 {
        self.max_code_length
    }

    /// Decode one symbol.
    #[inline]
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        if self.max_code_length == 0 {
            return Err(FlateError::invalid_huffman(reader.bit_position()));
        }

        // Near the end of input fewer than fast_bits may be available; the
        // slow path needs only as many bits as the code is long.
        if let Ok(bits) = reader.peek_bits(self.fast_bits) {
            let (symbol, len) = self.fast_table[bits as usize];
            if len > 0 {
                reader.skip_bits(len)?;
                return Ok(symbol);
            }
        }

        self.decode_slow(reader)
    }

    /// Canonical walk: one bit at a time, comparing the running code against
    /// the first code of each length.
    fn decode_slow<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let start = reader.bit_position();
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=MAX_CODE_LENGTH {
            code |= reader.read_bits(1)? as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(FlateError::invalid_huffman(start))
    }
}

/// A Huffman table for encoding: symbol to bit-reversed code.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    /// Codes, already reversed for LSB-first output.
    codes: Vec<u16>,
    /// Code length per symbol.
    lengths: Vec<u8>,
}

impl HuffmanEncoder {
    /// Build an encoder from code lengths.
    pub fn from_lengths(code_lengths: &[u8]) -> Result<Self> {
        let codes = canonical_codes(code_lengths)?
            .into_iter()
            .zip(code_lengths)
            .map(|(code, &len)| reverse_bits(code, len))
            .collect();

        Ok(Self {
            codes,
            lengths: code_lengths.to_vec(),
        })
    }

    /// Code lengths this encoder was built from.
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Code length of `symbol` (0 if unused or out of range).
    #[inline]
    pub fn length(&self, symbol: u16) -> u8 {
        self.lengths.get(symbol as usize).copied().unwrap_or(0)
    }

    /// Write the code for `symbol`.
    ///
    /// Fails with [`FlateError::UnknownSymbol`] if the symbol has no code.
    #[inline]
    pub fn write_symbol<W: Write>(&self, writer: &mut BitWriter<W>, symbol: u16) -> Result<()> {
        let len = self.length(symbol);
        if len == 0 {
            return Err(FlateError::unknown_symbol(symbol));
        }
        writer.write_bits(self.codes[symbol as usize] as u32, len)
    }
}

/// Builds length-limited code lengths from symbol frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a builder for an alphabet of `alphabet_size` symbols.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Create a builder from a frequency table.
    pub fn from_frequencies(frequencies: &[u32], max_length: u8) -> Self {
        Self {
            frequencies: frequencies.to_vec(),
            max_length,
        }
    }

    /// Add a symbol occurrence.
    pub fn add(&mut self, symbol: u16) {
        self.add_count(symbol, 1);
    }

    /// Add multiple occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        if let Some(freq) = self.frequencies.get_mut(symbol as usize) {
            *freq += count;
        }
    }

    /// Build code lengths.
    ///
    /// At least two symbols always receive a code, even if fewer were seen,
    /// so the result is a complete prefix code that every decoder accepts.
    pub fn build_lengths(&self) -> Vec<u8> {
        let n = self.frequencies.len();
        let mut lengths = vec![0u8; n];

        let mut used: Vec<usize> = (0..n).filter(|&i| self.frequencies[i] > 0).collect();
        if n < 2 {
            if n == 1 {
                lengths[0] = 1;
            }
            return lengths;
        }
        while used.len() < 2 {
            let filler = (0..n).find(|i| !used.contains(i)).unwrap_or(0);
            used.push(filler);
            used.sort_unstable();
        }

        let depths = Self::tree_depths(&used, &self.frequencies);

        // Number of codes per length, with overlong codes folded in.
        let max_len = self.max_length as usize;
        let deepest = depths.iter().copied().max().unwrap_or(0);
        let mut num_codes = vec![0u32; deepest.max(max_len) + 1];
        for &depth in &depths {
            num_codes[depth] += 1;
        }
        Self::enforce_max_length(&mut num_codes, max_len);

        // Most frequent symbols take the shortest lengths.
        let mut order = used;
        order.sort_by_key(|&s| (Reverse(self.frequencies[s]), s));
        let mut symbols = order.into_iter();
        for (len, &count) in num_codes.iter().enumerate().take(max_len + 1).skip(1) {
            for _ in 0..count {
                if let Some(symbol) = symbols.next() {
                    lengths[symbol] = len as u8;
                }
            }
        }

        lengths
    }

    /// Depth of each used symbol in an unconstrained Huffman tree.
    fn tree_depths(used: &[usize], frequencies: &[u32]) -> Vec<usize> {
        // Leaves are nodes 0..used.len(); internal nodes follow.
        let mut parent = vec![usize::MAX; used.len() * 2 - 1];
        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = used
            .iter()
            .enumerate()
            .map(|(node, &symbol)| Reverse((frequencies[symbol].max(1) as u64, node)))
            .collect();

        let mut next = used.len();
        while heap.len() > 1 {
            let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) else {
                break;
            };
            parent[a] = next;
            parent[b] = next;
            heap.push(Reverse((wa + wb, next)));
            next += 1;
        }

        (0..used.len())
            .map(|leaf| {
                let mut depth = 0;
                let mut node = leaf;
                while parent[node] != usize::MAX {
                    node = parent[node];
                    depth += 1;
                }
                depth
            })
            .collect()
    }

    /// Fold codes longer than `max_len` back under the limit, keeping the
    /// Kraft sum exactly 1.
    fn enforce_max_length(num_codes: &mut [u32], max_len: usize) {
        for i in max_len + 1..num_codes.len() {
            num_codes[max_len] += num_codes[i];
            num_codes[i] = 0;
        }

        let mut total: u64 = (1..=max_len)
            .map(|i| (num_codes[i] as u64) << (max_len - i))
            .sum();

        while total > 1u64 << max_len {
            num_codes[max_len] -= 1;
            for i in (1..max_len).rev() {
                if num_codes[i] != 0 {
                    num_codes[i] -= 1;
                    num_codes[i + 1] += 2;
                    break;
                }
            }
            total -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn kraft_sum(lengths: &[u8], max: u8) -> u64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 1u64 << (max - l))
            .sum()
    }

    #[test]
    fn test_canonical_codes_rfc_example() {
        // RFC 1951 Section 3.2.2: ABCDEFGH with lengths (3, 3, 3, 3, 3, 2, 4, 4)
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lengths).unwrap();
        assert_eq!(
            codes,
            vec![0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111]
        );
    }

    #[test]
    fn test_huffman_tree_simple() {
        // A=0, B=10, C=11; LSB-first packing of A B C A = 0 01 11 0
        let lengths = [1u8, 2, 2];
        let tree = HuffmanTree::from_code_lengths(&lengths).unwrap();

        let data = vec![0b00011010u8];
        let mut reader = BitReader::new(Cursor::new(data));

        assert_eq!(tree.decode(&mut reader).unwrap(), 0);
        assert_eq!(tree.decode(&mut reader).unwrap(), 1);
        assert_eq!(tree.decode(&mut reader).unwrap(), 2);
        assert_eq!(tree.decode(&mut reader).unwrap(), 0);
    }

    #[test]
    fn test_encode_decode_long_codes() {
        // Skewed frequencies force codes longer than the fast table.
        let mut freqs = vec![0u32; 40];
        let mut f = 1u32;
        for freq in freqs.iter_mut() {
            *freq = f;
            f = f.saturating_mul(2).min(1 << 24);
        }
        let lengths = HuffmanBuilder::from_frequencies(&freqs, 15).build_lengths();
        assert!(lengths.iter().any(|&l| l > 9));
        assert!(lengths.iter().all(|&l| l <= 15));

        let encoder = HuffmanEncoder::from_lengths(&lengths).unwrap();
        let tree = HuffmanTree::from_code_lengths(&lengths).unwrap();

        let mut writer = BitWriter::new(Vec::new());
        for symbol in 0..40u16 {
            encoder.write_symbol(&mut writer, symbol).unwrap();
        }
        let bytes = writer.finish().unwrap();

        let mut reader = BitReader::new(Cursor::new(bytes));
        for symbol in 0..40u16 {
            assert_eq!(tree.decode(&mut reader).unwrap(), symbol);
        }
    }

    #[test]
    fn test_oversubscribed_rejected() {
        let lengths = [1u8, 1, 1];
        let err = HuffmanTree::from_code_lengths(&lengths).unwrap_err();
        assert_eq!(err.kind(), oxiflate_core::ErrorKind::CorruptData);
    }

    #[test]
    fn test_overlong_length_rejected() {
        let lengths = [16u8, 1];
        assert!(HuffmanTree::from_code_lengths(&lengths).is_err());
    }

    #[test]
    fn test_empty_tree_fails_to_decode() {
        let tree = HuffmanTree::from_code_lengths(&[0u8; 4]).unwrap();
        assert_eq!(tree.max_code_length(), 0);

        let mut reader = BitReader::new(Cursor::new(vec![0xFF]));
        let err = tree.decode(&mut reader).unwrap_err();
        assert!(matches!(err, FlateError::InvalidHuffmanCode { .. }));
    }

    #[test]
    fn test_incomplete_code_unassigned_pattern() {
        // Only symbol 0 with code "0"; pattern "1" is unassigned.
        let tree = HuffmanTree::from_code_lengths(&[1u8, 0]).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0b10]));
        assert_eq!(tree.decode(&mut reader).unwrap(), 0);
        assert!(tree.decode(&mut reader).is_err());
    }

    #[test]
    fn test_encoder_unknown_symbol() {
        let encoder = HuffmanEncoder::from_lengths(&[1u8, 1, 0]).unwrap();
        let mut writer = BitWriter::new(Vec::new());
        let err = encoder.write_symbol(&mut writer, 2).unwrap_err();
        assert!(matches!(err, FlateError::UnknownSymbol { symbol: 2 }));
        assert!(encoder.write_symbol(&mut writer, 300).is_err());
    }

    #[test]
    fn test_huffman_builder_orders_by_frequency() {
        let mut builder = HuffmanBuilder::new(4, 15);
        builder.add_count(0, 100);
        builder.add_count(1, 50);
        builder.add_count(2, 25);
        builder.add_count(3, 25);

        let lengths = builder.build_lengths();
        assert_eq!(lengths, vec![1, 2, 3, 3]);
        assert_eq!(kraft_sum(&lengths, 15), 1 << 15);
    }

    #[test]
    fn test_builder_single_and_empty() {
        let mut builder = HuffmanBuilder::new(30, 15);
        builder.add(7);
        let lengths = builder.build_lengths();
        assert_eq!(lengths[7], 1);
        assert_eq!(lengths.iter().filter(|&&l| l > 0).count(), 2);

        let lengths = HuffmanBuilder::new(30, 15).build_lengths();
        assert_eq!(lengths.iter().filter(|&&l| l > 0).count(), 2);
        assert_eq!(kraft_sum(&lengths, 15), 1 << 15);
    }

    #[test]
    fn test_builder_length_limit() {
        // Fibonacci frequencies produce a maximally deep tree.
        let mut freqs = vec![1u32, 1];
        while freqs.len() < 19 {
            let next = freqs[freqs.len() - 1] + freqs[freqs.len() - 2];
            freqs.push(next);
        }
        let lengths = HuffmanBuilder::from_frequencies(&freqs, 7).build_lengths();

        assert!(lengths.iter().all(|&l| (1..=7).contains(&l)));
        assert_eq!(kraft_sum(&lengths, 7), 1 << 7);
        HuffmanTree::from_code_lengths(&lengths).unwrap();
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b101, 3), 0b101);
        assert_eq!(reverse_bits(0b1100, 4), 0b0011);
        assert_eq!(reverse_bits(0b10101010, 8), 0b01010101);
        assert_eq!(reverse_bits(1, 15), 1 << 14);
    }
}
