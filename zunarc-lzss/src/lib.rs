//! # ZunArc LZSS
//!
//! Pure Rust decoder for the LZSS variant found in ZUN's game data.
//!
//! The format is the classic Okumura-style LZSS with an 8 KB window:
//!
//! - **Control bit**: `1` for a literal, `0` for a back-reference
//! - **Literal**: 8 bits
//! - **Back-reference**: 13-bit absolute window slot + 4-bit length (3..=18)
//! - **End marker**: a back-reference to slot 0
//! - **Bit order**: MSB-first
//!
//! The bit widths, match bias and starting slot are collected in
//! [`LzssParams`]; [`LzssParams::ZUN`] holds the values every ZUN title uses.
//!
//! ## Example
//!
//! ```rust
//! use zunarc_lzss::{decompress, decompress_unbounded};
//!
//! // 'Z' as a literal, 4 bytes copied from slot 1, then an end marker cut
//! // short by the end of input
//! let stream = [0xAD, 0x00, 0x02, 0x20, 0x00];
//!
//! assert_eq!(decompress(&stream, 5).unwrap(), b"ZZZZZ");
//! assert_eq!(decompress_unbounded(&stream).unwrap(), b"ZZZZZ");
//! ```
//!
//! ## Encoder
//!
//! The `encoder` feature adds [`LzssEncoder`] and [`compress`], a companion
//! encoder meant for building test fixtures and benchmark input.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod decode;
#[cfg(any(test, feature = "encoder"))]
pub mod encode;
pub mod params;

// Re-exports
pub use decode::{
    DecodeStats, LzssDecoder, decompress, decompress_unbounded, decompress_unbounded_with,
    decompress_with,
};
#[cfg(any(test, feature = "encoder"))]
pub use encode::{LzssEncoder, LzssToken, compress, compress_with, encode_tokens};
pub use params::LzssParams;
