//! Error types for ZunArc operations.
//!
//! The taxonomy splits into two groups. Container-level errors mean the
//! entry table itself cannot be trusted and abort a whole decode call.
//! Entry-level errors only concern one payload and are reported next to
//! the results of its siblings.

use thiserror::Error;

/// The main error type for ZunArc operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZunError {
    /// The buffer is shorter than a field requires.
    #[error("Truncated input: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes that were left.
        available: usize,
    },

    /// Header or descriptor values violate the container's bounds invariants.
    #[error("Malformed container: {message}")]
    MalformedContainer {
        /// Description of the violation.
        message: String,
    },

    /// The compressed token stream is internally inconsistent.
    #[error("Corrupt stream at bit {bit_position}: {message}")]
    CorruptStream {
        /// Bit position in the compressed input where the problem was found.
        bit_position: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A token would produce more bytes than the declared output size.
    #[error("Output overrun: declared size is {declared} bytes, token would reach {attempted}")]
    OverrunOutput {
        /// Declared decompressed size.
        declared: usize,
        /// Size the output would have reached.
        attempted: usize,
    },

    /// Integrity check failed for one entry.
    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the descriptor.
        expected: u32,
        /// Checksum of the decoded bytes.
        computed: u32,
    },

    /// Invalid magic number in the container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Container version this decoder does not understand.
    #[error("Unsupported container version: {version}")]
    UnsupportedVersion {
        /// Version field from the header.
        version: u16,
    },

    /// Codec or cipher parameters out of range.
    #[error("Invalid parameters: {message}")]
    InvalidParameters {
        /// Description of the problem.
        message: String,
    },

    /// Entry not found in archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// Decoding of this entry was abandoned after cancellation.
    #[error("Decoding cancelled before this entry was started")]
    Cancelled,
}

/// Result type alias for ZunArc operations.
pub type Result<T> = std::result::Result<T, ZunError>;

impl ZunError {
    /// Create a truncated input error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::TruncatedInput { needed, available }
    }

    /// Create a malformed container error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer {
            message: message.into(),
        }
    }

    /// Create a corrupt stream error.
    pub fn corrupt(bit_position: u64, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            bit_position,
            message: message.into(),
        }
    }

    /// Create an output overrun error.
    pub fn overrun(declared: usize, attempted: usize) -> Self {
        Self::OverrunOutput {
            declared,
            attempted,
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(version: u16) -> Self {
        Self::UnsupportedVersion { version }
    }

    /// Create an invalid parameters error.
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Whether this error invalidates the whole container.
    pub fn is_container_error(&self) -> bool {
        matches!(
            self,
            Self::TruncatedInput { .. }
                | Self::MalformedContainer { .. }
                | Self::InvalidMagic { .. }
                | Self::UnsupportedVersion { .. }
        )
    }

    /// Whether this error is isolated to a single entry.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            Self::CorruptStream { .. }
                | Self::OverrunOutput { .. }
                | Self::ChecksumMismatch { .. }
                | Self::Cancelled
        )
    }
}
