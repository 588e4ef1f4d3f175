//! Bit-level I/O for the DEFLATE bitstream.
//!
//! DEFLATE packs data LSB-first: the first bit of a field lands in the least
//! significant free bit of the current byte. Huffman codes are the one
//! exception (they are stored MSB-first), which the Huffman layer handles by
//! bit-reversing codes before handing them to [`BitWriter::write_bits`].
//!
//! # Example
//!
//! ```
//! use oxiflate_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b1100, 4).unwrap();
//! let output = writer.finish().unwrap();
//!
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{FlateError, Result};
use std::io::{ErrorKind, Read, Write};

/// A bit-level reader that wraps any `Read` implementation.
///
/// Bytes are pulled from the underlying reader only as far as the requested
/// bit count needs, so after [`align_to_byte`](Self::align_to_byte) the
/// buffered remainder plus the reader position is exactly the unread input.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Total number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Byte index and bit offset (0-7) of the read cursor.
    pub fn position(&self) -> (u64, u8) {
        (self.total_bits_read / 8, (self.total_bits_read % 8) as u8)
    }

    /// Ensure at least `count` bits are buffered.
    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot fill more than 32 bits at once");

        while self.bits_in_buffer < count {
            let bytes_needed = (count - self.bits_in_buffer).div_ceil(8) as usize;
            let mut temp_buf = [0u8; 4];
            match self.reader.read(&mut temp_buf[..bytes_needed]) {
                Ok(0) => return Err(FlateError::truncated(self.total_bits_read)),
                Ok(n) => {
                    for &byte in &temp_buf[..n] {
                        self.buffer |= (byte as u64) << self.bits_in_buffer;
                        self.bits_in_buffer += 8;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FlateError::from_read(e, self.total_bits_read)),
            }
        }

        Ok(())
    }

    /// Read up to 32 bits, first bit read in the LSB position.
    ///
    /// Fails with [`FlateError::TruncatedStream`] if fewer than `count` bits
    /// remain.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        let result = (self.buffer & mask) as u32;

        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;

        Ok(result)
    }

    /// Peek at up to 32 bits without consuming them.
    #[inline]
    pub fn peek_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        Ok((self.buffer & mask) as u32)
    }

    /// Skip bits that have already been peeked.
    pub fn skip_bits(&mut self, count: u8) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        self.fill_buffer(count)?;

        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;

        Ok(())
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Align to the next byte boundary by discarding partial bits.
    pub fn align_to_byte(&mut self) {
        let remainder = (self.total_bits_read % 8) as u8;
        if remainder > 0 {
            let skip = 8 - remainder;
            // The partial byte is always buffered when the cursor is unaligned.
            self.buffer >>= skip;
            self.bits_in_buffer -= skip;
            self.total_bits_read += skip as u64;
        }
    }

    /// Read bytes directly. The cursor must be byte-aligned.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert!(self.total_bits_read % 8 == 0, "read_bytes on unaligned cursor");

        let mut offset = 0;
        while self.bits_in_buffer >= 8 && offset < buf.len() {
            buf[offset] = (self.buffer & 0xFF) as u8;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
            self.total_bits_read += 8;
            offset += 1;
        }

        if offset < buf.len() {
            self.reader
                .read_exact(&mut buf[offset..])
                .map_err(|e| FlateError::from_read(e, self.total_bits_read))?;
            self.total_bits_read += (buf.len() - offset) as u64 * 8;
        }

        Ok(())
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// Complete bytes are passed to the underlying writer as soon as they are
/// formed. Call [`finish`](Self::finish) to pad the final partial byte and
/// get the writer back; dropping a `BitWriter` discards pending bits.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Pass complete bytes from the buffer to the writer.
    #[inline]
    fn flush_bytes(&mut self) -> Result<()> {
        if self.bits_in_buffer >= 32 {
            let bytes = (self.buffer as u32).to_le_bytes();
            self.writer.write_all(&bytes)?;
            self.buffer >>= 32;
            self.bits_in_buffer -= 32;
        }

        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer & 0xFF) as u8;
            self.writer.write_all(&[byte])?;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
        Ok(())
    }

    /// Append up to 32 bits of `value`, LSB first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return Ok(());
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count).wrapping_sub(1)
        };
        let value = value & mask;

        self.buffer |= (value as u64) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes()
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Pad to the next byte boundary with zeros.
    pub fn align_to_byte(&mut self) -> Result<()> {
        let remainder = (self.total_bits_written % 8) as u8;
        if remainder != 0 {
            self.write_bits(0, 8 - remainder)?;
        }
        Ok(())
    }

    /// Write whole bytes. Pending bits are merged in if the cursor is not
    /// aligned.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.flush_bytes()?;

        if self.bits_in_buffer > 0 {
            for &byte in buf {
                self.write_bits(byte as u32, 8)?;
            }
        } else {
            self.writer.write_all(buf)?;
            self.total_bits_written += buf.len() as u64 * 8;
        }

        Ok(())
    }

    /// Pad the last byte and flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.flush_bytes()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}
