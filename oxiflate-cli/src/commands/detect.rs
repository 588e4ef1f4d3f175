//! Detect command implementation.

use oxiflate::{detect, is_zlib_format};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

pub fn cmd_detect(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut magic = Vec::with_capacity(16);
    File::open(file)?.take(16).read_to_end(&mut magic)?;

    println!("File: {}", file.display());
    match detect(&magic) {
        Some(format) => println!("Format: {}", format),
        None => println!("Format: unknown"),
    }
    println!("Magic bytes: {:02X?}", magic);
    if is_zlib_format(&magic) {
        println!("Zlib signature: yes (common header)");
    }

    Ok(())
}
