//! Sliding history window for DEFLATE decoding.
//!
//! Back-references reach at most 32 KiB into previously decoded output, so the
//! decoder keeps a power-of-two ring of that size. Decoded bytes also collect
//! in a pending buffer until the caller drains them to the output sink, which
//! lets streaming decoders hand off output in bounded chunks.

use crate::error::{FlateError, Result};
use std::io::Write;

/// DEFLATE history size (32 KiB).
pub const WINDOW_SIZE: usize = 32768;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// History ring plus not-yet-delivered output.
#[derive(Debug, Clone)]
pub struct Window {
    /// Ring storage.
    ring: Box<[u8]>,
    /// Next write index in `ring`.
    position: usize,
    /// Valid history bytes (saturates at `WINDOW_SIZE`).
    filled: usize,
    /// Decoded bytes not yet drained.
    pending: Vec<u8>,
    /// Total bytes ever written.
    total: u64,
}

impl Window {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            ring: vec![0u8; WINDOW_SIZE].into_boxed_slice(),
            position: 0,
            filled: 0,
            pending: Vec::new(),
            total: 0,
        }
    }

    /// Bytes of history available to back-references.
    pub fn history_len(&self) -> usize {
        self.filled
    }

    /// Total bytes written since creation or the last [`clear`](Self::clear).
    pub fn total_out(&self) -> u64 {
        self.total
    }

    /// Number of bytes waiting to be drained.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Bytes waiting to be drained.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.ring[self.position] = byte;
        self.position = (self.position + 1) & WINDOW_MASK;
        if self.filled < WINDOW_SIZE {
            self.filled += 1;
        }
        self.pending.push(byte);
    }

    /// Append one decoded literal.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.push(byte);
        self.total += 1;
    }

    /// Append a run of literal bytes (stored blocks).
    pub fn write_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
        self.total += bytes.len() as u64;
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// Overlapping copies (`length > distance`) repeat the pattern, as LZ77
    /// requires.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.filled {
            return Err(FlateError::invalid_distance(distance, self.filled));
        }

        self.pending.reserve(length);
        let mut src = self.position.wrapping_sub(distance) & WINDOW_MASK;
        for _ in 0..length {
            let byte = self.ring[src];
            self.push(byte);
            src = (src + 1) & WINDOW_MASK;
        }
        self.total += length as u64;

        Ok(())
    }

    /// Move pending bytes into `out`.
    pub fn take_pending(&mut self, out: &mut Vec<u8>) {
        out.append(&mut self.pending);
    }

    /// Write pending bytes to `writer` and clear them.
    pub fn drain_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        if !self.pending.is_empty() {
            writer.write_all(&self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_and_match() {
        let mut window = Window::new();
        window.write_slice(b"Hello");
        window.copy_match(5, 5).unwrap();

        assert_eq!(window.pending(), b"HelloHello");
        assert_eq!(window.total_out(), 10);
        assert_eq!(window.history_len(), 10);
    }

    #[test]
    fn test_overlapping_copy() {
        let mut window = Window::new();
        window.write_slice(b"AB");
        window.copy_match(2, 6).unwrap();
        assert_eq!(window.pending(), b"ABABABAB");

        let mut window = Window::new();
        window.write_byte(b'X');
        window.copy_match(1, 5).unwrap();
        assert_eq!(window.pending(), b"XXXXXX");
    }

    #[test]
    fn test_invalid_distance() {
        let mut window = Window::new();
        assert!(window.copy_match(1, 3).is_err());

        window.write_slice(b"abc");
        let err = window.copy_match(4, 3).unwrap_err();
        assert!(matches!(
            err,
            FlateError::InvalidDistance {
                distance: 4,
                history_size: 3
            }
        ));
        assert!(window.copy_match(0, 3).is_err());
    }

    #[test]
    fn test_history_survives_drain() {
        let mut window = Window::new();
        window.write_slice(b"abcdef");

        let mut sink = Vec::new();
        window.drain_to(&mut sink).unwrap();
        assert_eq!(sink, b"abcdef");
        assert_eq!(window.pending_len(), 0);

        window.copy_match(6, 3).unwrap();
        window.drain_to(&mut sink).unwrap();
        assert_eq!(sink, b"abcdefabc");
    }

    #[test]
    fn test_wraparound() {
        let mut window = Window::new();
        let data: Vec<u8> = (0..WINDOW_SIZE + 100).map(|i| (i % 251) as u8).collect();
        window.write_slice(&data);
        assert_eq!(window.history_len(), WINDOW_SIZE);

        let mut out = Vec::new();
        window.take_pending(&mut out);
        window.copy_match(WINDOW_SIZE, 4).unwrap();
        let start = data.len() - WINDOW_SIZE;
        assert_eq!(window.pending(), &data[start..start + 4]);
        assert!(window.copy_match(WINDOW_SIZE + 1, 1).is_err());
    }
}
