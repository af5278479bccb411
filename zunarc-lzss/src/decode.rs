//! ZUN LZSS decompression.
//!
//! Each token starts with one control bit:
//!
//! ```text
//! 1 <8 bits>                      literal byte
//! 0 <index_bits> <length_bits>    copy length+min_match bytes from window[index..]
//! 0 <index_bits == 0>             end of stream
//! ```
//!
//! Two termination modes exist. Container entries declare their decoded
//! size, and decoding stops exactly there ([`LzssDecoder::decode`]). Raw
//! streams carry no size and run until the end marker
//! ([`LzssDecoder::decode_unbounded`]).

use crate::params::LzssParams;
use tracing::trace;
use zunarc_core::error::{Result, ZunError};
use zunarc_core::{BitStream, RingBuffer};

/// Token counters from the last decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Literal tokens.
    pub literals: usize,
    /// Back-reference tokens.
    pub matches: usize,
    /// Bytes produced by back-references.
    pub copied: usize,
    /// Bits consumed from the input.
    pub bits_read: u64,
}

/// LZSS decoder using a ring buffer window.
#[derive(Debug)]
pub struct LzssDecoder {
    /// Stream layout.
    params: LzssParams,
    /// Ring buffer for history.
    window: RingBuffer,
    /// Counters for the most recent decode.
    stats: DecodeStats,
}

impl LzssDecoder {
    /// Create a new decoder for the given parameters.
    pub fn new(params: LzssParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            window: RingBuffer::with_origin(params.window_size(), params.initial_write_index),
            stats: DecodeStats::default(),
        })
    }

    /// Create a decoder with ZUN's parameters.
    pub fn zun() -> Self {
        Self {
            params: LzssParams::ZUN,
            window: RingBuffer::zun(),
            stats: DecodeStats::default(),
        }
    }

    /// Parameters this decoder was built with.
    pub fn params(&self) -> &LzssParams {
        &self.params
    }

    /// Token counters from the most recent decode.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Reset the decoder.
    pub fn reset(&mut self) {
        self.window.clear();
        self.stats = DecodeStats::default();
    }

    /// Decode exactly `expected_len` bytes.
    ///
    /// Input left over once the output is complete is ignored.
    ///
    /// # Errors
    ///
    /// - [`ZunError::CorruptStream`] if the input ends, a field is cut
    ///   short, the end marker appears, or a copy reads an unwritten window
    ///   slot before `expected_len` bytes exist.
    /// - [`ZunError::OverrunOutput`] if a copy would run past `expected_len`.
    pub fn decode(&mut self, input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        self.reset();

        let mut bits = BitStream::from_slice(input);
        // Every token of at least one bit yields at most one byte per bit,
        // so a declared size above that can never be reached.
        let capacity_hint = expected_len.min(input.len().saturating_mul(8));
        let mut output = Vec::with_capacity(capacity_hint);

        while output.len() < expected_len {
            let token_pos = bits.bit_position();
            let is_literal = bits.read_bit().map_err(|_| {
                ZunError::corrupt(
                    token_pos,
                    format!(
                        "stream ended after {} of {} bytes",
                        output.len(),
                        expected_len
                    ),
                )
            })?;

            if is_literal {
                let byte = read_field(&mut bits, 8, "literal")? as u8;
                self.window.write_byte(byte);
                output.push(byte);
                self.stats.literals += 1;
                continue;
            }

            let index = read_field(&mut bits, self.params.index_bits, "window index")? as usize;
            if index == LzssParams::END_OF_STREAM {
                return Err(ZunError::corrupt(
                    token_pos,
                    format!(
                        "end-of-stream marker after {} of {} bytes",
                        output.len(),
                        expected_len
                    ),
                ));
            }

            let length = read_field(&mut bits, self.params.length_bits, "match length")? as usize
                + self.params.min_match;
            let attempted = output.len() + length;
            if attempted > expected_len {
                return Err(ZunError::overrun(expected_len, attempted));
            }

            self.copy_match(index, length, &mut output, token_pos)?;
        }

        self.stats.bits_read = bits.bit_position();
        trace!(
            literals = self.stats.literals,
            matches = self.stats.matches,
            copied = self.stats.copied,
            unused_bits = bits.remaining_bits(),
            "lzss bounded decode finished"
        );

        Ok(output)
    }

    /// Decode a stream of unknown size up to its end marker.
    ///
    /// The end marker must finish the input: either its index field is cut
    /// short by the end of input (missing bits read as zero) or it ends on
    /// the very last bit. Input that ends exactly on a token boundary is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// [`ZunError::CorruptStream`] for truncated literals or matches, copies
    /// from unwritten window slots, and any bits after the end marker, zero
    /// bits included. The latter usually means the data is not LZSS or the
    /// parameters are wrong.
    pub fn decode_unbounded(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.reset();

        let mut bits = BitStream::from_slice(input);
        let mut output = Vec::with_capacity(input.len().saturating_mul(2));

        while !bits.is_exhausted() {
            let token_pos = bits.bit_position();
            if bits.read_bit()? {
                let byte = read_field(&mut bits, 8, "literal")? as u8;
                self.window.write_byte(byte);
                output.push(byte);
                self.stats.literals += 1;
                continue;
            }

            let (index, present) = bits.read_bits_zero_padded(self.params.index_bits)?;
            if index as usize == LzssParams::END_OF_STREAM {
                if !bits.is_exhausted() {
                    return Err(ZunError::corrupt(
                        bits.bit_position(),
                        "data after end-of-stream marker: the input is not LZSS data \
                         or the LZSS parameters are wrong",
                    ));
                }
                break;
            }
            if present < self.params.index_bits {
                return Err(ZunError::corrupt(token_pos, "truncated window index field"));
            }

            let length = read_field(&mut bits, self.params.length_bits, "match length")? as usize
                + self.params.min_match;
            self.copy_match(index as usize, length, &mut output, token_pos)?;
        }

        self.stats.bits_read = bits.bit_position();
        trace!(
            literals = self.stats.literals,
            matches = self.stats.matches,
            copied = self.stats.copied,
            produced = output.len(),
            "lzss unbounded decode finished"
        );

        Ok(output)
    }

    fn copy_match(
        &mut self,
        index: usize,
        length: usize,
        output: &mut Vec<u8>,
        token_pos: u64,
    ) -> Result<()> {
        let distance = self.window.distance_to(index);
        let produced = output.len();

        self.window
            .copy_from_index(index, length, output)
            .map_err(|slot| {
                ZunError::corrupt(
                    token_pos,
                    format!(
                        "back-reference to unwritten window slot {slot} \
                         (index {index}, distance {distance}, {produced} bytes produced)"
                    ),
                )
            })?;

        self.stats.matches += 1;
        self.stats.copied += length;
        Ok(())
    }
}

/// Read a fixed-width field, mapping truncation to a stream error.
fn read_field(bits: &mut BitStream<'_>, width: u8, what: &str) -> Result<u32> {
    let pos = bits.bit_position();
    bits.read_bits(width)
        .map_err(|_| ZunError::corrupt(pos, format!("truncated {what} field")))
}

/// Decompress exactly `expected_len` bytes of a ZUN LZSS stream.
pub fn decompress(input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    LzssDecoder::zun().decode(input, expected_len)
}

/// Decompress exactly `expected_len` bytes with custom parameters.
pub fn decompress_with(input: &[u8], expected_len: usize, params: LzssParams) -> Result<Vec<u8>> {
    LzssDecoder::new(params)?.decode(input, expected_len)
}

/// Decompress a ZUN LZSS stream up to its end marker.
pub fn decompress_unbounded(input: &[u8]) -> Result<Vec<u8>> {
    LzssDecoder::zun().decode_unbounded(input)
}

/// Decompress a stream up to its end marker with custom parameters.
pub fn decompress_unbounded_with(input: &[u8], params: LzssParams) -> Result<Vec<u8>> {
    LzssDecoder::new(params)?.decode_unbounded(input)
}
