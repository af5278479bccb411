//! Bit-level I/O for the ZUN LZSS control stream.
//!
//! ZUN's LZSS packs control bits, literals and back-reference fields into a
//! single stream with no byte alignment between tokens.
//!
//! # Bit Ordering
//!
//! Bits are consumed MSB-first (Most Significant Bit first) within each
//! byte, and multi-bit fields are assembled MSB-first as well. This is the
//! opposite of DEFLATE and LZH, which pack LSB-first.
//!
//! # Example
//!
//! ```
//! use zunarc_core::bitstream::{BitStream, BitWriter};
//! use zunarc_core::ByteReader;
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let data = writer.into_vec();
//!
//! let mut bits = BitStream::new(ByteReader::new(&data));
//! assert_eq!(bits.read_bits(3).unwrap(), 0b101);
//! assert_eq!(bits.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{Result, ZunError};
use crate::reader::ByteReader;

/// MSB-first bit reader layered on a [`ByteReader`].
#[derive(Debug, Clone)]
pub struct BitStream<'a> {
    /// Underlying byte cursor.
    reader: ByteReader<'a>,
    /// Byte currently being consumed.
    current: u8,
    /// Unconsumed bits left in `current` (counted from the MSB side).
    bits_left: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<'a> BitStream<'a> {
    /// Create a new bit stream over the given reader.
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self {
            reader,
            current: 0,
            bits_left: 0,
            total_bits_read: 0,
        }
    }

    /// Create a bit stream over a byte slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(ByteReader::new(data))
    }

    /// Total number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of bits that can still be read.
    pub fn remaining_bits(&self) -> u64 {
        self.bits_left as u64 + self.reader.remaining() as u64 * 8
    }

    /// Whether every bit has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            self.current = self.reader.read_u8()?;
            self.bits_left = 8;
        }

        self.bits_left -= 1;
        self.total_bits_read += 1;
        Ok((self.current >> self.bits_left) & 1 != 0)
    }

    /// Read up to 32 bits, first bit read ends up in the most significant
    /// position of the result.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        if count > 32 {
            return Err(ZunError::invalid_parameters(format!(
                "cannot read {count} bits at once (max 32)"
            )));
        }

        let available = self.remaining_bits();
        if (count as u64) > available {
            return Err(ZunError::truncated(
                (count as usize).div_ceil(8),
                available.div_ceil(8) as usize,
            ));
        }

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Read up to 32 bits, treating bits past the end of input as zero.
    ///
    /// Returns the value and the number of bits that were actually present.
    pub fn read_bits_zero_padded(&mut self, count: u8) -> Result<(u32, u8)> {
        if count > 32 {
            return Err(ZunError::invalid_parameters(format!(
                "cannot read {count} bits at once (max 32)"
            )));
        }

        let present = (count as u64).min(self.remaining_bits()) as u8;
        let mut value = 0u32;
        for _ in 0..present {
            value = (value << 1) | self.read_bit()? as u32;
        }
        let value = value.checked_shl((count - present) as u32).unwrap_or(0);
        Ok((value, present))
    }
}

/// MSB-first bit writer producing a byte vector.
///
/// Used by encoders that build ZUN streams for tests and benchmarks.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Output buffer.
    output: Vec<u8>,
    /// Pending bits (right-aligned).
    buffer: u8,
    /// Number of pending bits.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create a new MSB-first bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.bits_in_buffer += 1;
        self.total_bits_written += 1;

        if self.bits_in_buffer == 8 {
            self.output.push(self.buffer);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }

    /// Pad the final partial byte with zeros.
    pub fn flush(&mut self) {
        if self.bits_in_buffer > 0 {
            let padding = 8 - self.bits_in_buffer;
            self.output.push(self.buffer << padding);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Flush and return the output data.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }
}
