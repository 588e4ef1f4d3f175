//! Edge case tests for compression and decompression.

use oxiflate::{
    CompressOptions, CompressionLevel, Format, compress, compress_with, decompress, deflate,
    inflate, is_zlib_format,
};

fn pseudo_random(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

fn text_like(len: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"the ", b"quick ", b"brown ", b"fox ", b"jumps ", b"over ", b"lazy ", b"dog. ",
    ];
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[(i * 5 + i / 3) % words.len()]);
        i += 1;
    }
    out.truncate(len);
    out
}

fn samples() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("empty", Vec::new()),
        ("single", b"A".to_vec()),
        ("two", b"AB".to_vec()),
        ("zeros", vec![0u8; 1000]),
        ("same_byte", vec![255u8; 5000]),
        ("all_bytes", (0..=255u8).cycle().take(4096).collect()),
        ("random", pseudo_random(20_000, 7)),
        ("text", text_like(50_000)),
        ("utf8", "Grüße aus Tōkyō, 世界! ".repeat(200).into_bytes()),
    ]
}

#[test]
fn test_roundtrip_all_levels() {
    for (name, input) in samples() {
        for level in 0..=9 {
            let compressed = compress(&input, level).unwrap();
            let decompressed = decompress(&compressed).unwrap();
            assert_eq!(decompressed, input, "{} at level {}", name, level);

            if !input.is_empty() {
                assert!(is_zlib_format(&compressed), "{} at level {}", name, level);
            }
        }
    }
}

#[test]
fn test_raw_roundtrip_all_levels() {
    for (name, input) in samples() {
        for level in 0..=9 {
            let level = CompressionLevel::new(level).unwrap();
            let compressed = deflate(&input, level).unwrap();
            assert_eq!(inflate(&compressed).unwrap(), input, "{} at {}", name, level);
        }
    }
}

#[test]
fn test_gzip_roundtrip_all_levels() {
    for (name, input) in samples() {
        for level in [0, 1, 6, 9] {
            let options = CompressOptions::new(CompressionLevel::new(level).unwrap())
                .format(Format::Gzip);
            let compressed = compress_with(&input, &options).unwrap();
            assert_eq!(decompress(&compressed).unwrap(), input, "{} at {}", name, level);
        }
    }
}

#[test]
fn test_all_zeros_compress_well() {
    let input = vec![0u8; 1000];
    let compressed = compress(&input, 6).unwrap();
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_random_does_not_expand_much() {
    // Incompressible blocks fall back to stored blocks.
    let input = pseudo_random(100_000, 42);
    let compressed = compress(&input, 9).unwrap();
    assert!(compressed.len() <= input.len() + 128);
}

#[test]
fn test_max_match_length() {
    let input = vec![42u8; 258 * 10];
    let compressed = compress(&input, 9).unwrap();
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn test_long_distance_match() {
    // The second copy of the block sits exactly 32 KiB back.
    let block = pseudo_random(32 * 1024, 3);
    let mut input = block.clone();
    input.extend_from_slice(&block);

    for level in [1, 6, 9] {
        let compressed = compress(&input, level).unwrap();
        assert!(compressed.len() < input.len() * 3 / 4, "level {}", level);
        assert_eq!(decompress(&compressed).unwrap(), input);
    }
}

#[test]
fn test_beyond_window_not_matched() {
    // Repetition 40 KiB back is outside the window and cannot be used.
    let block = pseudo_random(40 * 1024, 11);
    let mut input = block.clone();
    input.extend_from_slice(&block);

    let compressed = compress(&input, 9).unwrap();
    assert!(compressed.len() > input.len() * 9 / 10);
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn test_large_input() {
    let input = text_like(1024 * 1024);
    let compressed = compress(&input, 6).unwrap();
    assert!(compressed.len() < input.len() / 4);
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn test_compression_levels() {
    let input = text_like(100_000);
    let stored = compress(&input, 0).unwrap();
    let fast = compress(&input, 1).unwrap();
    let best = compress(&input, 9).unwrap();

    assert!(stored.len() > input.len());
    assert!(fast.len() < stored.len());
    assert!(best.len() <= fast.len() + 16);
}

#[test]
fn test_header_per_level() {
    let expected = [0x01, 0x01, 0x5E, 0x5E, 0x5E, 0x5E, 0x9C, 0xDA, 0xDA, 0xDA];
    for (level, flg) in expected.into_iter().enumerate() {
        let compressed = compress(b"header", level as i32).unwrap();
        assert_eq!(compressed[..2], [0x78, flg], "level {}", level);
    }
}
