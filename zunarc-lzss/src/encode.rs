//! ZUN LZSS compression.
//!
//! The encoder exists so that tests and benchmarks can produce streams
//! with a known decoding. It is a greedy matcher over hash chains: fast
//! enough for fixtures, not tuned for ratio.

use crate::params::LzssParams;
use std::collections::HashMap;
use zunarc_core::BitWriter;
use zunarc_core::error::Result;

/// Default number of chain candidates inspected per position.
const DEFAULT_MAX_CHAIN: usize = 64;

/// LZSS token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzssToken {
    /// A literal byte.
    Literal(u8),
    /// A copy from the window.
    Match {
        /// Absolute window slot the copy starts at.
        index: u16,
        /// Number of bytes to copy.
        length: u16,
    },
}

/// Greedy LZSS encoder.
#[derive(Debug, Clone)]
pub struct LzssEncoder {
    /// Stream layout.
    params: LzssParams,
    /// Maximum hash chain candidates checked per position.
    max_chain: usize,
}

impl LzssEncoder {
    /// Create a new encoder for the given parameters.
    pub fn new(params: LzssParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            max_chain: DEFAULT_MAX_CHAIN,
        })
    }

    /// Create an encoder with ZUN's parameters.
    pub fn zun() -> Self {
        Self {
            params: LzssParams::ZUN,
            max_chain: DEFAULT_MAX_CHAIN,
        }
    }

    /// Limit the number of match candidates per position.
    pub fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain.max(1);
        self
    }

    /// Split `data` into tokens.
    pub fn tokens(&self, data: &[u8]) -> Vec<LzssToken> {
        let window = self.params.window_size();
        let mask = window - 1;
        let origin = self.params.initial_write_index;
        let min_match = self.params.min_match.max(1);
        let max_match = self.params.max_match();

        // Most recent position for each 3-byte prefix, chained backwards
        let mut head: HashMap<[u8; 3], usize> = HashMap::new();
        let mut prev = vec![usize::MAX; data.len()];

        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let mut best_len = 0;
            let mut best_index = 0;

            if pos + 3 <= data.len() {
                let key = [data[pos], data[pos + 1], data[pos + 2]];
                let mut candidate = head.get(&key).copied();
                let mut checked = 0;

                while let Some(start) = candidate {
                    let distance = pos - start;
                    if distance >= window || checked >= self.max_chain {
                        break;
                    }
                    checked += 1;

                    let index = (origin + start) & mask;
                    if index != LzssParams::END_OF_STREAM {
                        let limit = max_match.min(data.len() - pos);
                        let len = (0..limit)
                            .take_while(|&k| data[start + k] == data[pos + k])
                            .count();
                        if len > best_len {
                            best_len = len;
                            best_index = index;
                            if len == limit {
                                break;
                            }
                        }
                    }

                    candidate = match prev[start] {
                        usize::MAX => None,
                        older => Some(older),
                    };
                }
            }

            if best_len >= min_match {
                tokens.push(LzssToken::Match {
                    index: best_index as u16,
                    length: best_len as u16,
                });
                for p in pos..pos + best_len {
                    insert_chain(data, p, &mut head, &mut prev);
                }
                pos += best_len;
            } else {
                tokens.push(LzssToken::Literal(data[pos]));
                insert_chain(data, pos, &mut head, &mut prev);
                pos += 1;
            }
        }

        tokens
    }

    /// Compress `data` into a terminated bit stream.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        encode_tokens(&self.tokens(data), &self.params)
    }
}

/// Link `pos` into the hash chain of its 3-byte prefix.
fn insert_chain(data: &[u8], pos: usize, head: &mut HashMap<[u8; 3], usize>, prev: &mut [usize]) {
    if pos + 3 <= data.len() {
        let key = [data[pos], data[pos + 1], data[pos + 2]];
        if let Some(old) = head.insert(key, pos) {
            prev[pos] = old;
        }
    }
}

/// Serialize tokens, followed by an end marker.
///
/// The marker is cut short at the end of the final byte, the way ZUN's own
/// files end, so both termination modes accept the output.
pub fn encode_tokens(tokens: &[LzssToken], params: &LzssParams) -> Vec<u8> {
    let mut writer = BitWriter::new();

    for token in tokens {
        match *token {
            LzssToken::Literal(byte) => {
                writer.write_bit(true);
                writer.write_bits(byte as u32, 8);
            }
            LzssToken::Match { index, length } => {
                writer.write_bit(false);
                writer.write_bits(index as u32, params.index_bits);
                writer.write_bits(
                    (length as usize - params.min_match) as u32,
                    params.length_bits,
                );
            }
        }
    }

    writer.write_bit(false);
    let room = (8 - writer.bits_written() % 8) % 8;
    let marker_bits = (params.index_bits as u64).min(room) as u8;
    writer.write_bits(LzssParams::END_OF_STREAM as u32, marker_bits);
    writer.into_vec()
}

/// Compress data with ZUN's parameters.
pub fn compress(data: &[u8]) -> Vec<u8> {
    LzssEncoder::zun().encode(data)
}

/// Compress data with custom parameters.
pub fn compress_with(data: &[u8], params: LzssParams) -> Result<Vec<u8>> {
    Ok(LzssEncoder::new(params)?.encode(data))
}
