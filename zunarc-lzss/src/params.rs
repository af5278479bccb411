//! LZSS stream parameters.

use zunarc_core::error::{Result, ZunError};

/// Bit layout of an LZSS stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzssParams {
    /// Width of the window index field in bits. The window holds
    /// `1 << index_bits` bytes.
    pub index_bits: u8,
    /// Width of the match length field in bits.
    pub length_bits: u8,
    /// Value added to the length field to get the copy length.
    pub min_match: usize,
    /// Window slot the first output byte is written to.
    pub initial_write_index: usize,
}

impl LzssParams {
    /// ZUN's parameters, shared by the games' data files and replays.
    ///
    /// - 8 KB window addressed by a 13-bit absolute index
    /// - 4-bit length, copies of 3..=18 bytes
    /// - First byte written to slot 1, so index 0 can mark the end
    pub const ZUN: Self = Self {
        index_bits: 13,
        length_bits: 4,
        min_match: 3,
        initial_write_index: 1,
    };

    /// Window index that terminates the stream.
    pub const END_OF_STREAM: usize = 0;

    /// Largest accepted `min_match`.
    pub const MAX_MIN_MATCH: usize = 255;

    /// Create a validated parameter set.
    pub fn new(
        index_bits: u8,
        length_bits: u8,
        min_match: usize,
        initial_write_index: usize,
    ) -> Result<Self> {
        let params = Self {
            index_bits,
            length_bits,
            min_match,
            initial_write_index,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check that the fields describe a decodable stream.
    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.index_bits) {
            return Err(ZunError::invalid_parameters(format!(
                "index width {} out of range 1..=16",
                self.index_bits
            )));
        }
        if !(1..=8).contains(&self.length_bits) {
            return Err(ZunError::invalid_parameters(format!(
                "length width {} out of range 1..=8",
                self.length_bits
            )));
        }
        if self.min_match > Self::MAX_MIN_MATCH {
            return Err(ZunError::invalid_parameters(format!(
                "minimum match {} above {}",
                self.min_match,
                Self::MAX_MIN_MATCH
            )));
        }
        if self.initial_write_index >= self.window_size() {
            return Err(ZunError::invalid_parameters(format!(
                "initial write index {} outside a {}-byte window",
                self.initial_write_index,
                self.window_size()
            )));
        }
        Ok(())
    }

    /// Window capacity in bytes.
    pub fn window_size(&self) -> usize {
        1 << self.index_bits
    }

    /// Longest copy a single token can express.
    pub fn max_match(&self) -> usize {
        (1 << self.length_bits) - 1 + self.min_match
    }
}

impl Default for LzssParams {
    fn default() -> Self {
        Self::ZUN
    }
}
