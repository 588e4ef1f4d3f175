//! Constant tables for DEFLATE (RFC 1951).
//!
//! Length and distance symbols carry a base value plus a number of extra bits;
//! the fixed Huffman block type uses predefined code lengths so no table has
//! to be transmitted.

use crate::huffman::{HuffmanEncoder, HuffmanTree};
use oxiflate_core::error::{FlateError, Result};
use std::sync::OnceLock;

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub const FIXED_LITLEN_LENGTHS: [u8; 288] = {
    let mut lengths = [0u8; 288];
    let mut i = 0;
    while i < 288 {
        lengths[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lengths
};

/// Fixed distance code lengths: all 30 codes use 5 bits.
///
/// Symbols 30 and 31 also have 5-bit codes in the fixed table but never
/// appear in valid data.
pub const FIXED_DISTANCE_LENGTHS: [u8; 30] = [5u8; 30];

/// Fixed literal/length decoding tree, built once.
pub fn fixed_litlen_tree() -> Result<&'static HuffmanTree> {
    static TREE: OnceLock<Option<HuffmanTree>> = OnceLock::new();
    TREE.get_or_init(|| HuffmanTree::from_code_lengths(&FIXED_LITLEN_LENGTHS).ok())
        .as_ref()
        .ok_or_else(|| FlateError::corrupted(0, "fixed literal/length table"))
}

/// Fixed distance decoding tree, built once.
pub fn fixed_distance_tree() -> Result<&'static HuffmanTree> {
    static TREE: OnceLock<Option<HuffmanTree>> = OnceLock::new();
    TREE.get_or_init(|| HuffmanTree::from_code_lengths(&FIXED_DISTANCE_LENGTHS).ok())
        .as_ref()
        .ok_or_else(|| FlateError::corrupted(0, "fixed distance table"))
}

/// Fixed literal/length encoder, built once.
pub fn fixed_litlen_encoder() -> Result<&'static HuffmanEncoder> {
    static ENCODER: OnceLock<Option<HuffmanEncoder>> = OnceLock::new();
    ENCODER
        .get_or_init(|| HuffmanEncoder::from_lengths(&FIXED_LITLEN_LENGTHS).ok())
        .as_ref()
        .ok_or_else(|| FlateError::corrupted(0, "fixed literal/length table"))
}

/// Fixed distance encoder, built once.
pub fn fixed_distance_encoder() -> Result<&'static HuffmanEncoder> {
    static ENCODER: OnceLock<Option<HuffmanEncoder>> = OnceLock::new();
    ENCODER
        .get_or_init(|| HuffmanEncoder::from_lengths(&FIXED_DISTANCE_LENGTHS).ok())
        .as_ref()
        .ok_or_else(|| FlateError::corrupted(0, "fixed distance table"))
}

/// Base lengths for symbols 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits
];

/// Extra bits for symbols 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Base distances for distance symbols 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance symbols 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code length code lengths (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Map a match length (3-258) to `(symbol, extra_bits, extra_value)`.
pub fn length_to_code(length: u16) -> (u16, u8, u16) {
    debug_assert!(
        (3..=258).contains(&length),
        "Length out of range: {}",
        length
    );

    let length = length as usize;
    let code = match length {
        0..=10 => length.saturating_sub(3) + 257,
        11..=18 => (length - 11) / 2 + 265,
        19..=34 => (length - 19) / 4 + 269,
        35..=66 => (length - 35) / 8 + 273,
        67..=130 => (length - 67) / 16 + 277,
        131..=257 => (length - 131) / 32 + 281,
        _ => 285,
    };

    let index = code - 257;
    let extra_value = length.saturating_sub(LENGTH_BASE[index] as usize) as u16;
    (code as u16, LENGTH_EXTRA_BITS[index], extra_value)
}

/// Map a distance (1-32768) to `(symbol, extra_bits, extra_value)`.
pub fn distance_to_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(distance >= 1, "Distance out of range: {}", distance);

    let code = if distance <= 4 {
        distance.saturating_sub(1) as usize
    } else {
        // Two symbols per power of two above 4: the top bit picks the pair,
        // the bit below it picks the member.
        let d = (distance - 1) as u32;
        let top = 31 - d.leading_zeros();
        (top as usize) * 2 + ((d >> (top - 1)) & 1) as usize
    };

    let extra_value = distance - DISTANCE_BASE[code];
    (code as u16, DISTANCE_EXTRA_BITS[code], extra_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_litlen_lengths() {
        assert_eq!(FIXED_LITLEN_LENGTHS[0], 8);
        assert_eq!(FIXED_LITLEN_LENGTHS[143], 8);
        assert_eq!(FIXED_LITLEN_LENGTHS[144], 9);
        assert_eq!(FIXED_LITLEN_LENGTHS[255], 9);
        assert_eq!(FIXED_LITLEN_LENGTHS[256], 7); // End of block
        assert_eq!(FIXED_LITLEN_LENGTHS[279], 7);
        assert_eq!(FIXED_LITLEN_LENGTHS[280], 8);
        assert_eq!(FIXED_LITLEN_LENGTHS[287], 8);
    }

    #[test]
    fn test_fixed_tables_build() {
        fixed_litlen_tree().unwrap();
        fixed_distance_tree().unwrap();
        fixed_litlen_encoder().unwrap();
        fixed_distance_encoder().unwrap();
    }

    #[test]
    fn test_length_to_code_roundtrip() {
        for length in 3..=258u16 {
            let (code, extra_bits, extra_value) = length_to_code(length);
            let index = (code - 257) as usize;
            assert_eq!(LENGTH_EXTRA_BITS[index], extra_bits);
            assert!(u32::from(extra_value) < (1u32 << extra_bits));
            assert_eq!(LENGTH_BASE[index] + extra_value, length);
        }
    }

    #[test]
    fn test_distance_to_code_roundtrip() {
        for distance in 1..=32768u16 {
            let (code, extra_bits, extra_value) = distance_to_code(distance);
            let index = code as usize;
            assert_eq!(DISTANCE_EXTRA_BITS[index], extra_bits);
            assert!(u32::from(extra_value) < (1u32 << extra_bits));
            assert_eq!(DISTANCE_BASE[index] + extra_value, distance);
        }
    }

    #[test]
    fn test_specific_lengths() {
        assert_eq!(length_to_code(3), (257, 0, 0));
        assert_eq!(length_to_code(10), (264, 0, 0));
        assert_eq!(length_to_code(11), (265, 1, 0));
        assert_eq!(length_to_code(12), (265, 1, 1));
        assert_eq!(length_to_code(227), (284, 5, 0));
        assert_eq!(length_to_code(257), (284, 5, 30));
        assert_eq!(length_to_code(258), (285, 0, 0));
    }

    #[test]
    fn test_specific_distances() {
        assert_eq!(distance_to_code(1), (0, 0, 0));
        assert_eq!(distance_to_code(4), (3, 0, 0));
        assert_eq!(distance_to_code(5), (4, 1, 0));
        assert_eq!(distance_to_code(6), (4, 1, 1));
        assert_eq!(distance_to_code(7), (5, 1, 0));
        assert_eq!(distance_to_code(24577), (29, 13, 0));
        assert_eq!(distance_to_code(32768), (29, 13, 8191));
    }
}
