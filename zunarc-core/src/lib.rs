//! # ZunArc Core
//!
//! Core components for decoding ZUN data files.
//!
//! This crate provides the fundamental building blocks the codec and the
//! container layers are built on:
//!
//! - [`reader`]: Bounds-checked byte cursor over an in-memory buffer
//! - [`bitstream`]: MSB-first bit-level reading (and writing, for encoders)
//! - [`ringbuffer`]: Sliding window with absolute slot addressing
//! - [`crc`]: CRC-32 checksum
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: DecodeService, CLI                                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     ZDAT header/directory parsing, ZUN ciphers          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     ZUN LZSS                                            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     ByteReader, BitStream, RingBuffer, CRC              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Data only ever flows downward: no layer depends on one above it.
//!
//! ## Example
//!
//! ```rust
//! use zunarc_core::{BitStream, ByteReader, Crc32};
//!
//! let data = [0xAB, 0xCD];
//! let mut bits = BitStream::new(ByteReader::new(&data));
//! assert_eq!(bits.read_bits(12).unwrap(), 0xABC);
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod reader;
pub mod ringbuffer;

// Re-exports for convenience
pub use bitstream::{BitStream, BitWriter};
pub use crc::Crc32;
pub use error::{Result, ZunError};
pub use reader::ByteReader;
pub use ringbuffer::RingBuffer;
