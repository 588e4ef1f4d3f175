//! DEFLATE decompression (inflate).
//!
//! Decoding is an explicit state machine over the block structure of
//! RFC 1951:
//!
//! ```text
//!            ┌──────────────┐  BTYPE 00  ┌────────────┐
//!   start ──▶│ BlockHeader  │───────────▶│ StoredBody │──┐
//!            └──────────────┘            └────────────┘  │
//!              ▲    │ BTYPE 01/10        ┌─────────────┐ │
//!              │    └───────────────────▶│ HuffmanBody │─┤
//!              │                         └─────────────┘ │
//!              └──────── not final ◀─────────────────────┤
//!                                          final ──▶ Done
//! ```
//!
//! Output goes through a 32 KiB [`Window`] and is handed to the caller's
//! writer whenever the pending part reaches the flush threshold, so memory
//! stays bounded no matter how large the decoded stream is.

use crate::config::{CancelToken, DEFAULT_CHUNK_SIZE};
use crate::deflate::{BlockStats, BlockType};
use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanTree, LITLEN_ALPHABET_SIZE,
};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_BASE, DISTANCE_EXTRA_BITS, LENGTH_BASE, LENGTH_EXTRA_BITS,
    fixed_distance_tree, fixed_litlen_tree,
};
use oxiflate_core::error::{FlateError, Result};
use oxiflate_core::{BitReader, Window};
use std::borrow::Cow;
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Huffman tables of the block being decoded.
#[derive(Debug)]
struct BlockTables {
    litlen: Cow<'static, HuffmanTree>,
    dist: Cow<'static, HuffmanTree>,
}

/// Decoder position within the block structure.
#[derive(Debug)]
enum BlockState {
    /// Expecting BFINAL + BTYPE.
    Header,
    /// Inside a stored block with this many bytes left.
    Stored { remaining: usize },
    /// Inside a Huffman-coded block.
    Huffman(Box<BlockTables>),
    /// Final block finished.
    Done,
}

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    /// History and pending output.
    window: Window,
    /// Current state.
    state: BlockState,
    /// Whether the block being decoded carries BFINAL.
    final_block: bool,
    /// Optional ceiling on total output.
    limit: Option<u64>,
    /// Pending bytes that trigger a hand-off to the writer.
    flush_threshold: usize,
    /// Optional cancellation, checked at every hand-off.
    cancel: Option<CancelToken>,
    /// Blocks decoded so far.
    stats: BlockStats,
    /// Reused buffer for stored block payloads.
    scratch: Vec<u8>,
}

impl Inflater {
    /// Create a new DEFLATE decompressor.
    pub fn new() -> Self {
        Self {
            window: Window::new(),
            state: BlockState::Header,
            final_block: false,
            limit: None,
            flush_threshold: DEFAULT_CHUNK_SIZE,
            cancel: None,
            stats: BlockStats::default(),
            scratch: Vec::new(),
        }
    }

    /// Fail with [`FlateError::OutputTooLarge`] rather than produce more
    /// than `limit` bytes.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Hand output to the writer in chunks of about `threshold` bytes.
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold.max(1);
        self
    }

    /// Stop with [`FlateError::Cancelled`] once `token` fires.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Total bytes decoded so far.
    pub fn total_out(&self) -> u64 {
        self.window.total_out()
    }

    /// Blocks decoded so far.
    pub fn stats(&self) -> BlockStats {
        self.stats
    }

    /// Whether the final block has been decoded.
    pub fn is_done(&self) -> bool {
        matches!(self.state, BlockState::Done)
    }

    /// Decode the stream to its end, writing output to `sink`.
    ///
    /// On return the reader is positioned just after the last bit of the
    /// final block. Returns the number of bytes produced.
    pub fn inflate_to<R: Read, W: Write>(
        &mut self,
        reader: &mut BitReader<R>,
        sink: &mut W,
    ) -> Result<u64> {
        while !self.is_done() {
            self.step(reader)?;
            if self.window.pending_len() >= self.flush_threshold {
                self.flush(sink)?;
            }
        }
        self.flush(sink)?;

        debug!(
            total_out = self.total_out(),
            blocks = self.stats.total(),
            "inflate finished"
        );
        Ok(self.total_out())
    }

    fn flush<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                debug!(total_out = self.total_out(), "inflate cancelled");
                return Err(FlateError::Cancelled);
            }
        }
        self.window.drain_to(sink)
    }

    /// Advance the state machine by one bounded unit of work.
    fn step<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        self.state = match std::mem::replace(&mut self.state, BlockState::Done) {
            BlockState::Header => self.read_block_header(reader)?,
            BlockState::Stored { remaining } => {
                let room = self.flush_threshold.saturating_sub(self.window.pending_len());
                let n = remaining.min(room.max(1));
                self.reserve(n)?;

                self.scratch.resize(n, 0);
                reader.read_bytes(&mut self.scratch)?;
                self.window.write_slice(&self.scratch);

                if remaining == n {
                    self.end_of_block()
                } else {
                    BlockState::Stored {
                        remaining: remaining - n,
                    }
                }
            }
            BlockState::Huffman(tables) => {
                if self.decode_symbols(reader, &tables)? {
                    self.end_of_block()
                } else {
                    BlockState::Huffman(tables)
                }
            }
            BlockState::Done => BlockState::Done,
        };
        Ok(())
    }

    fn end_of_block(&self) -> BlockState {
        if self.final_block {
            BlockState::Done
        } else {
            BlockState::Header
        }
    }

    fn reserve(&self, n: usize) -> Result<()> {
        match self.limit {
            Some(limit) if self.window.total_out() + n as u64 > limit => {
                debug!(limit, "inflate output limit reached");
                Err(FlateError::output_too_large(limit))
            }
            _ => Ok(()),
        }
    }

    fn read_block_header<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<BlockState> {
        self.final_block = reader.read_bit()?;
        let btype = reader.read_bits(2)? as u8;

        let (block_type, state) = match btype {
            0 => {
                reader.align_to_byte();
                let len = reader.read_bits(16)? as u16;
                let nlen = reader.read_bits(16)? as u16;
                if len != !nlen {
                    return Err(FlateError::corrupted(
                        reader.bit_position() / 8,
                        format!("stored block LEN/NLEN mismatch: {:#06x} vs {:#06x}", len, nlen),
                    ));
                }
                (
                    BlockType::Stored,
                    BlockState::Stored {
                        remaining: len as usize,
                    },
                )
            }
            1 => (
                BlockType::Fixed,
                BlockState::Huffman(Box::new(BlockTables {
                    litlen: Cow::Borrowed(fixed_litlen_tree()?),
                    dist: Cow::Borrowed(fixed_distance_tree()?),
                })),
            ),
            2 => (
                BlockType::Dynamic,
                BlockState::Huffman(Box::new(read_dynamic_tables(reader)?)),
            ),
            _ => return Err(FlateError::invalid_block_type(btype)),
        };

        trace!(
            ?block_type,
            is_final = self.final_block,
            bit_position = reader.bit_position(),
            "inflate block"
        );
        self.stats.record(block_type);

        Ok(state)
    }

    /// Decode symbols until end-of-block (returns true) or until enough
    /// output is pending to hand off (returns false).
    fn decode_symbols<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        tables: &BlockTables,
    ) -> Result<bool> {
        while self.window.pending_len() < self.flush_threshold {
            let symbol = tables.litlen.decode(reader)?;

            match symbol {
                0..=255 => {
                    self.reserve(1)?;
                    self.window.write_byte(symbol as u8);
                }
                END_OF_BLOCK => return Ok(true),
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    let extra = reader.read_bits(LENGTH_EXTRA_BITS[index])? as usize;
                    let length = LENGTH_BASE[index] as usize + extra;

                    let dist_symbol = tables.dist.decode(reader)? as usize;
                    if dist_symbol >= DISTANCE_ALPHABET_SIZE {
                        return Err(FlateError::corrupted(
                            reader.bit_position() / 8,
                            format!("invalid distance symbol {}", dist_symbol),
                        ));
                    }
                    let extra = reader.read_bits(DISTANCE_EXTRA_BITS[dist_symbol])? as usize;
                    let distance = DISTANCE_BASE[dist_symbol] as usize + extra;

                    self.reserve(length)?;
                    self.window.copy_match(distance, length)?;
                }
                _ => {
                    return Err(FlateError::corrupted(
                        reader.bit_position() / 8,
                        format!("invalid literal/length symbol {}", symbol),
                    ));
                }
            }
        }

        Ok(false)
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the code length tables at the start of a dynamic block.
fn read_dynamic_tables<R: Read>(reader: &mut BitReader<R>) -> Result<BlockTables> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    if hlit > LITLEN_ALPHABET_SIZE || hdist > DISTANCE_ALPHABET_SIZE {
        return Err(FlateError::corrupted(
            reader.bit_position() / 8,
            format!("too many length or distance codes ({}, {})", hlit, hdist),
        ));
    }

    let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
    for &symbol in &CODE_LENGTH_ORDER[..hclen] {
        codelen_lengths[symbol] = reader.read_bits(3)? as u8;
    }
    let codelen_tree = HuffmanTree::from_code_lengths(&codelen_lengths)?;

    let mut lengths = vec![0u8; hlit + hdist];
    let mut i = 0;
    while i < lengths.len() {
        let symbol = codelen_tree.decode(reader)?;

        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                if i == 0 {
                    return Err(FlateError::corrupted(
                        reader.bit_position() / 8,
                        "repeat code with no previous length",
                    ));
                }
                (lengths[i - 1], reader.read_bits(2)? as usize + 3)
            }
            17 => (0, reader.read_bits(3)? as usize + 3),
            18 => (0, reader.read_bits(7)? as usize + 11),
            _ => return Err(FlateError::invalid_huffman(reader.bit_position())),
        };

        if i + repeat > lengths.len() {
            return Err(FlateError::corrupted(
                reader.bit_position() / 8,
                "code lengths overrun the table",
            ));
        }
        lengths[i..i + repeat].fill(value);
        i += repeat;
    }

    let (litlen_lengths, dist_lengths) = lengths.split_at(hlit);
    if litlen_lengths[END_OF_BLOCK as usize] == 0 {
        return Err(FlateError::corrupted(
            reader.bit_position() / 8,
            "dynamic block has no end-of-block code",
        ));
    }

    Ok(BlockTables {
        litlen: Cow::Owned(HuffmanTree::from_code_lengths(litlen_lengths)?),
        dist: Cow::Owned(HuffmanTree::from_code_lengths(dist_lengths)?),
    })
}

/// Decompress a raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(data);
    let mut output = Vec::with_capacity(data.len().saturating_mul(2));
    Inflater::new().inflate_to(&mut reader, &mut output)?;
    Ok(output)
}

/// Decompress a raw DEFLATE stream, failing past `limit` output bytes.
pub fn inflate_with_limit(data: &[u8], limit: u64) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(data);
    let mut output = Vec::new();
    Inflater::new()
        .with_limit(limit)
        .inflate_to(&mut reader, &mut output)?;
    Ok(output)
}
