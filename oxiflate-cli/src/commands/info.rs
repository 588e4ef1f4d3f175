//! Info command implementation.

use crate::utils::human_size;
use oxiflate::{GzipHeader, StreamInfo, inspect_with_limit};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct InfoJson {
    file: String,
    format: String,
    compressed_size: u64,
    uncompressed_size: u64,
    ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    zlib: Option<ZlibJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    gzip_members: Vec<GzipMemberJson>,
    blocks: BlocksJson,
}

#[derive(Serialize)]
struct ZlibJson {
    window_bits: u8,
    level: String,
}

#[derive(Serialize)]
struct GzipMemberJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    mtime: u32,
    os: u8,
    text: bool,
    extra_len: usize,
    header_crc: bool,
}

#[derive(Serialize)]
struct BlocksJson {
    stored: u64,
    fixed: u64,
    dynamic: u64,
}

impl From<&GzipHeader> for GzipMemberJson {
    fn from(header: &GzipHeader) -> Self {
        Self {
            filename: header.filename.clone(),
            comment: header.comment.clone(),
            mtime: header.mtime,
            os: header.os,
            text: header.text,
            extra_len: header.extra.as_ref().map_or(0, Vec::len),
            header_crc: header.header_crc,
        }
    }
}

fn to_json(file: &PathBuf, info: &StreamInfo) -> InfoJson {
    InfoJson {
        file: file.display().to_string(),
        format: info.format.name().to_string(),
        compressed_size: info.compressed_size,
        uncompressed_size: info.uncompressed_size,
        ratio: info.ratio,
        zlib: info.zlib_header.map(|h| ZlibJson {
            window_bits: h.window_bits,
            level: format!("{:?}", h.level),
        }),
        gzip_members: info.gzip_members.iter().map(GzipMemberJson::from).collect(),
        blocks: BlocksJson {
            stored: info.blocks.stored,
            fixed: info.blocks.fixed,
            dynamic: info.blocks.dynamic,
        },
    }
}

pub fn cmd_info(
    file: &PathBuf,
    json: bool,
    max_output: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(file)?;
    let info = inspect_with_limit(&data, max_output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(file, &info))?);
        return Ok(());
    }

    println!("Stream Information");
    println!("==================");
    println!("File: {}", file.display());
    println!("Format: {}", info.format);
    println!(
        "Compressed size: {} ({} bytes)",
        human_size(info.compressed_size),
        info.compressed_size
    );
    println!(
        "Uncompressed size: {} ({} bytes)",
        human_size(info.uncompressed_size),
        info.uncompressed_size
    );
    println!("Ratio: {:.1}%", info.ratio);

    if let Some(header) = info.zlib_header {
        println!();
        println!("Zlib Header:");
        println!("  Window: {} bytes", 1u32 << header.window_bits);
        println!("  Level hint: {:?}", header.level);
    }

    for (i, header) in info.gzip_members.iter().enumerate() {
        println!();
        println!("GZIP Member {}:", i + 1);
        if let Some(name) = &header.filename {
            println!("  Original filename: {}", name);
        }
        if let Some(comment) = &header.comment {
            println!("  Comment: {}", comment);
        }
        if header.mtime > 0 {
            println!("  Modification time: {} (Unix timestamp)", header.mtime);
        }
        println!("  OS: {}", header.os);
        if let Some(extra) = &header.extra {
            println!("  Extra field: {} bytes", extra.len());
        }
        if header.header_crc {
            println!("  Header CRC: present");
        }
    }

    println!();
    println!(
        "Blocks: {} stored, {} fixed, {} dynamic",
        info.blocks.stored, info.blocks.fixed, info.blocks.dynamic
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxiflate::{CompressOptions, CompressionLevel, Format, compress_with};

    #[test]
    fn test_json_shape() {
        let options = CompressOptions::new(CompressionLevel::BEST)
            .format(Format::Gzip)
            .gzip_header(GzipHeader::new().filename("notes.txt").mtime(42));
        let data = compress_with(b"some notes, some notes, some notes", &options).unwrap();
        let info = oxiflate::inspect(&data).unwrap();

        let value = serde_json::to_value(to_json(&PathBuf::from("notes.txt.gz"), &info)).unwrap();
        assert_eq!(value["format"], "gzip");
        assert_eq!(value["uncompressed_size"], 34);
        assert_eq!(value["gzip_members"][0]["filename"], "notes.txt");
        assert_eq!(value["gzip_members"][0]["mtime"], 42);
        assert!(value.get("zlib").is_none());
    }
}
