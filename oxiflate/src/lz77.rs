//! LZ77 match finding for DEFLATE.
//!
//! The encoder keeps the last 32 KiB of input as history and indexes every
//! position by a hash of its next three bytes. Positions with the same hash
//! form a chain, most recent first, so the search naturally meets nearer
//! candidates before farther ones and keeps the nearer one on a length tie.
//!
//! # Algorithm
//!
//! For each position the chain is walked up to [`MatchParams::max_chain`]
//! candidates and the longest match (3-258 bytes, at most 32768 back) wins.
//! With lazy matching, a match is held back one byte: if the next position
//! matches longer, a literal is emitted instead and the longer match taken.
//! Every position a match covers is indexed too, so later searches can point
//! into the middle of earlier matches.
//!
//! Input may arrive in several calls; history carries over between them.

use crate::config::MatchParams;
use oxiflate_core::WINDOW_SIZE;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Length-3 matches farther than this cost more than three literals.
const TOO_FAR: usize = 4096;

/// Hash table size in bits.
const HASH_BITS: u32 = 15;

/// Size of the hash table (power of 2).
const HASH_SIZE: usize = 1 << HASH_BITS;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// A token produced by LZ77 compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

impl Lz77Token {
    /// Number of input bytes this token covers.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => *length as usize,
        }
    }

    /// Always false; every token covers at least one byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A candidate found by the search.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    length: usize,
    distance: usize,
}

/// LZ77 encoder for DEFLATE compression.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// History followed by the data being tokenized.
    window: Vec<u8>,
    /// Absolute stream position of `window[0]`.
    base: usize,
    /// Hash head: most recent absolute position + 1 for each hash (0 = none).
    head: Vec<usize>,
    /// Previous position + 1 with the same hash, indexed by position mod 32K.
    prev: Vec<usize>,
    /// Next absolute position to be indexed.
    insert_pos: usize,
    /// Search effort.
    params: MatchParams,
}

impl Lz77Encoder {
    /// Create an encoder with the given search parameters.
    pub fn new(params: MatchParams) -> Self {
        Self {
            window: Vec::new(),
            base: 0,
            head: vec![0; HASH_SIZE],
            prev: vec![0; WINDOW_SIZE],
            insert_pos: 0,
            params,
        }
    }

    /// Total bytes seen so far.
    pub fn total_in(&self) -> usize {
        self.base + self.window.len()
    }

    /// Hash of the three bytes at window index `i`.
    #[inline(always)]
    fn hash_at(&self, i: usize) -> usize {
        let v = u32::from_le_bytes([self.window[i], self.window[i + 1], self.window[i + 2], 0]);
        (v.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    /// Index every position before `target` that has three bytes available.
    fn insert_until(&mut self, target: usize) {
        let end = self.total_in();
        while self.insert_pos < target && self.insert_pos + MIN_MATCH <= end {
            let abs = self.insert_pos;
            let h = self.hash_at(abs - self.base);
            self.prev[abs & WINDOW_MASK] = self.head[h];
            self.head[h] = abs + 1;
            self.insert_pos += 1;
        }
    }

    /// Drop history older than the window so the buffer stays bounded.
    fn slide(&mut self) {
        if self.window.len() > WINDOW_SIZE {
            let excess = self.window.len() - WINDOW_SIZE;
            self.window.drain(..excess);
            self.base += excess;
        }
    }

    /// Longest match for absolute position `pos`, not reaching past `end`.
    fn find_match(&self, pos: usize, end: usize) -> Option<Candidate> {
        let max_len = (end - pos).min(MAX_MATCH);
        if self.params.max_chain == 0 || max_len < MIN_MATCH {
            return None;
        }

        let p = pos - self.base;
        let mut candidate = self.head[self.hash_at(p)];
        let mut chain = self.params.max_chain;
        let mut best = Candidate {
            length: MIN_MATCH - 1,
            distance: 0,
        };

        while candidate != 0 && chain > 0 {
            let cpos = candidate - 1;
            if cpos >= pos || cpos < self.base {
                break;
            }
            let distance = pos - cpos;
            if distance > WINDOW_SIZE {
                break;
            }

            let c = cpos - self.base;
            if self.window[c + best.length] == self.window[p + best.length] {
                let length = self.window[c..c + max_len]
                    .iter()
                    .zip(&self.window[p..p + max_len])
                    .take_while(|(a, b)| a == b)
                    .count();

                if length > best.length && !(length == MIN_MATCH && distance > TOO_FAR) {
                    best = Candidate { length, distance };
                    if length >= max_len || length >= self.params.nice_length {
                        break;
                    }
                }
            }

            let next = self.prev[cpos & WINDOW_MASK];
            // Chain links only point backwards; anything else is a reused slot.
            if next >= candidate {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        (best.length >= MIN_MATCH).then_some(best)
    }

    /// Tokenize `input`, appending to `tokens`.
    ///
    /// Matches may reach back into input from earlier calls but never past
    /// the end of `input`, so the tokens cover exactly `input`.
    pub fn compress(&mut self, input: &[u8], tokens: &mut Vec<Lz77Token>) {
        if input.is_empty() {
            return;
        }

        self.slide();
        let start = self.total_in();
        self.window.extend_from_slice(input);
        let end = self.total_in();

        let mut pos = start;
        let mut held: Option<Candidate> = None;

        while pos < end {
            self.insert_until(pos);
            let current = self.find_match(pos, end);

            if let Some(prev) = held.take() {
                // `prev` was found at pos - 1.
                if current.is_some_and(|c| c.length > prev.length) {
                    tokens.push(Lz77Token::Literal(self.window[pos - 1 - self.base]));
                    held = current;
                    pos += 1;
                } else {
                    tokens.push(Self::match_token(prev));
                    pos = pos - 1 + prev.length;
                }
                continue;
            }

            match current {
                Some(c) if self.params.lazy && c.length < self.params.nice_length => {
                    held = Some(c);
                    pos += 1;
                }
                Some(c) => {
                    tokens.push(Self::match_token(c));
                    pos += c.length;
                }
                None => {
                    tokens.push(Lz77Token::Literal(self.window[pos - self.base]));
                    pos += 1;
                }
            }
        }

        if let Some(prev) = held {
            tokens.push(Self::match_token(prev));
        }

        self.insert_until(end);
    }

    fn match_token(candidate: Candidate) -> Lz77Token {
        Lz77Token::Match {
            length: candidate.length as u16,
            distance: candidate.distance as u16,
        }
    }

    /// Tokenize a whole buffer in one call.
    pub fn compress_all(input: &[u8], params: MatchParams) -> Vec<Lz77Token> {
        let mut encoder = Self::new(params);
        let mut tokens = Vec::with_capacity(input.len() / 2);
        encoder.compress(input, &mut tokens);
        tokens
    }
}
