//! Ratio command implementation.

use oxiflate::compression_ratio;

pub fn cmd_ratio(original: u64, compressed: u64) {
    println!("{:.2}%", compression_ratio(original, compressed));
}
