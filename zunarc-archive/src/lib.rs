//! # ZunArc Archive
//!
//! ZDAT container support for ZunArc.
//!
//! A ZDAT container packs many entries, each LZSS-compressed with ZUN's
//! parameters (or stored), optionally encrypted with one of ZUN's two
//! ciphers and optionally protected by a CRC-32 of the decoded bytes.
//!
//! - [`header`]: container header and entry directory
//! - [`crypto`]: additive and block interleave ciphers
//! - [`service`]: per-entry decoding with partial-failure tolerance
//!
//! ## Example
//!
//! ```rust,no_run
//! use zunarc_archive::decode;
//!
//! let raw = std::fs::read("th08.dat").unwrap();
//! let result = decode(&raw).unwrap();
//!
//! for entry in result.successes() {
//!     println!("{} ({} bytes)", entry.name(), entry.len());
//! }
//! for (name, failure) in result.failures() {
//!     eprintln!("{}: {}", name, failure);
//! }
//! ```
//!
//! ## Parallel decoding
//!
//! With the `parallel` feature, entries are decoded on the rayon thread
//! pool unless [`DecodeOptions::parallel`] is turned off. Output is the
//! same either way.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crypto;
pub mod header;
pub mod service;

// Re-exports
pub use crypto::Cipher;
pub use header::{Container, ContainerHeader, EntryDescriptor};
pub use service::{
    ArchiveDecoder, CancelToken, ChecksumPolicy, DecodeOptions, DecodeResult, DecodedEntry,
    EntryFailure, EntryResult, decode, decode_one,
};
