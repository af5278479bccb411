//! Whole-archive decoding.
//!
//! [`ArchiveDecoder`] parses a container once, then decodes every entry
//! independently. A damaged entry produces an [`EntryFailure`] in the
//! result map while its neighbours still decode; only a broken header or
//! directory fails the call as a whole.

use crate::crypto::Cipher;
use crate::header::{Container, DEFAULT_MAX_ENTRY_SIZE, EntryDescriptor};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use zunarc_core::crc::Crc32;
use zunarc_core::error::{Result, ZunError};
use zunarc_lzss::{LzssDecoder, LzssParams};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What to do with an entry whose checksum does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumPolicy {
    /// Report the mismatch and drop the bytes.
    #[default]
    Discard,
    /// Report the mismatch and keep the bytes in [`EntryFailure::salvaged`].
    Keep,
}

/// Decoding options.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// LZSS stream layout.
    pub params: LzssParams,
    /// Handling of checksum mismatches.
    pub checksum_policy: ChecksumPolicy,
    /// Compare stored CRC-32 values with the decoded bytes.
    pub verify_checksums: bool,
    /// Decode entries on the rayon thread pool (feature `parallel`).
    pub parallel: bool,
    /// Largest declared decoded size accepted for one entry.
    pub max_entry_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            params: LzssParams::ZUN,
            checksum_policy: ChecksumPolicy::Discard,
            verify_checksums: true,
            parallel: true,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }
}

impl DecodeOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the LZSS parameters.
    pub fn with_params(mut self, params: LzssParams) -> Self {
        self.params = params;
        self
    }

    /// Set the checksum policy.
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    /// Enable or disable checksum verification.
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Enable or disable parallel decoding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the per-entry size limit.
    pub fn with_max_entry_size(mut self, max_entry_size: usize) -> Self {
        self.max_entry_size = max_entry_size;
        self
    }
}

/// Cooperative cancellation flag shared between a caller and a decode.
///
/// Checked before each entry starts. Entries already decoded keep their
/// results; the rest fail with [`ZunError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A successfully decoded entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Directory record the entry came from.
    pub descriptor: EntryDescriptor,
    /// Decoded bytes, exactly `descriptor.decompressed_len` long.
    pub data: Vec<u8>,
}

impl DecodedEntry {
    /// Entry name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Decoded size.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the entry decoded to zero bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Why an entry could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// The failure.
    pub error: ZunError,
    /// Decoded bytes kept despite a checksum mismatch
    /// ([`ChecksumPolicy::Keep`] only).
    pub salvaged: Option<Vec<u8>>,
}

impl EntryFailure {
    fn new(error: ZunError) -> Self {
        Self {
            error,
            salvaged: None,
        }
    }
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(bytes) = &self.salvaged {
            write!(f, " ({} bytes salvaged)", bytes.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for EntryFailure {}

/// Outcome of one entry.
pub type EntryResult = std::result::Result<DecodedEntry, EntryFailure>;

/// Per-entry outcomes, in directory order.
///
/// When a name occurs more than once, the last descriptor wins and the
/// name keeps the position of its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeResult {
    entries: IndexMap<String, EntryResult>,
}

impl DecodeResult {
    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive had no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcome for `name`.
    pub fn get(&self, name: &str) -> Option<&EntryResult> {
        self.entries.get(name)
    }

    /// All outcomes in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntryResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    /// Successfully decoded entries.
    pub fn successes(&self) -> impl Iterator<Item = &DecodedEntry> {
        self.entries.values().filter_map(|r| r.as_ref().ok())
    }

    /// Failed entries with their names.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &EntryFailure)> {
        self.entries
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }

    /// Whether every entry decoded.
    pub fn is_complete(&self) -> bool {
        self.entries.values().all(|r| r.is_ok())
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> IndexMap<String, EntryResult> {
        self.entries
    }
}

impl IntoIterator for DecodeResult {
    type Item = (String, EntryResult);
    type IntoIter = indexmap::map::IntoIter<String, EntryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Stateless archive decoder.
///
/// # Example
///
/// ```rust,no_run
/// use zunarc_archive::{ArchiveDecoder, DecodeOptions};
///
/// let raw = std::fs::read("th06.dat").unwrap();
/// let decoder = ArchiveDecoder::new(DecodeOptions::default());
///
/// for (name, result) in decoder.decode(&raw).unwrap().iter() {
///     match result {
///         Ok(entry) => println!("{}: {} bytes", name, entry.len()),
///         Err(failure) => eprintln!("{}: {}", name, failure),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveDecoder {
    options: DecodeOptions,
}

impl ArchiveDecoder {
    /// Create a decoder.
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decoder options.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Parse the header and directory without decoding anything.
    pub fn list(&self, raw: &[u8]) -> Result<Container> {
        self.options.params.validate()?;
        Container::parse_with_limit(raw, self.options.max_entry_size)
    }

    /// Decode every entry.
    pub fn decode(&self, raw: &[u8]) -> Result<DecodeResult> {
        self.decode_inner(raw, None)
    }

    /// Decode every entry, stopping early once `cancel` fires.
    pub fn decode_with_cancel(&self, raw: &[u8], cancel: &CancelToken) -> Result<DecodeResult> {
        self.decode_inner(raw, Some(cancel))
    }

    /// Decode a single entry by name.
    ///
    /// With duplicate names the last descriptor is used, matching
    /// [`ArchiveDecoder::decode`].
    pub fn decode_one(&self, raw: &[u8], name: &str) -> Result<DecodedEntry> {
        let container = self.list(raw)?;
        let descriptor = container
            .entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .ok_or_else(|| ZunError::entry_not_found(name))?;

        self.decode_entry(raw, descriptor).map_err(|f| f.error)
    }

    fn decode_inner(&self, raw: &[u8], cancel: Option<&CancelToken>) -> Result<DecodeResult> {
        let container = self.list(raw)?;

        // Position of each name is its first occurrence, the descriptor its last
        let mut winners: IndexMap<&str, &EntryDescriptor> = IndexMap::new();
        for entry in &container.entries {
            if winners.insert(entry.name.as_str(), entry).is_some() {
                debug!(entry = %entry.name, "duplicate entry name, later descriptor wins");
            }
        }
        let jobs: Vec<&EntryDescriptor> = winners.into_values().collect();

        debug!(
            entries = container.entries.len(),
            distinct = jobs.len(),
            directory_size = container.header.directory_size,
            "parsed container"
        );

        let run = |descriptor: &EntryDescriptor| -> EntryResult {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(EntryFailure::new(ZunError::Cancelled));
            }
            self.decode_entry(raw, descriptor)
        };

        let outcomes = self.run_jobs(&jobs, run);

        let mut entries = IndexMap::with_capacity(jobs.len());
        for (descriptor, outcome) in jobs.into_iter().zip(outcomes) {
            if let Err(failure) = &outcome {
                warn!(entry = %descriptor.name, error = %failure.error, "entry failed");
            }
            entries.insert(descriptor.name.clone(), outcome);
        }

        Ok(DecodeResult { entries })
    }

    #[cfg(feature = "parallel")]
    fn run_jobs<F>(&self, jobs: &[&EntryDescriptor], run: F) -> Vec<EntryResult>
    where
        F: Fn(&EntryDescriptor) -> EntryResult + Sync,
    {
        if self.options.parallel && jobs.len() > 1 {
            jobs.par_iter().map(|d| run(*d)).collect()
        } else {
            jobs.iter().map(|d| run(*d)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_jobs<F>(&self, jobs: &[&EntryDescriptor], run: F) -> Vec<EntryResult>
    where
        F: Fn(&EntryDescriptor) -> EntryResult,
    {
        jobs.iter().map(|d| run(*d)).collect()
    }

    /// Slice, decrypt, decompress and verify one entry.
    fn decode_entry(&self, raw: &[u8], descriptor: &EntryDescriptor) -> EntryResult {
        // Bounds were checked when the directory was parsed
        let payload = &raw[descriptor.payload_range()];
        let expected_len = descriptor.decompressed_len as usize;

        let decrypted;
        let payload = if descriptor.cipher == Cipher::None {
            payload
        } else {
            let mut buf = payload.to_vec();
            descriptor.cipher.decrypt(&mut buf).map_err(EntryFailure::new)?;
            decrypted = buf;
            &decrypted[..]
        };

        let data = if descriptor.is_stored() {
            payload.to_vec()
        } else {
            let mut decoder = LzssDecoder::new(self.options.params).map_err(EntryFailure::new)?;
            decoder
                .decode(payload, expected_len)
                .map_err(EntryFailure::new)?
        };

        if let Some(expected) = descriptor.checksum.filter(|_| self.options.verify_checksums) {
            let computed = Crc32::compute(&data);
            if computed != expected {
                let salvaged = match self.options.checksum_policy {
                    ChecksumPolicy::Keep => Some(data),
                    ChecksumPolicy::Discard => None,
                };
                return Err(EntryFailure {
                    error: ZunError::checksum_mismatch(expected, computed),
                    salvaged,
                });
            }
        }

        debug!(
            entry = %descriptor.name,
            compressed = descriptor.compressed_len,
            decompressed = data.len(),
            stored = descriptor.is_stored(),
            cipher = descriptor.cipher.name(),
            "decoded entry"
        );

        Ok(DecodedEntry {
            descriptor: descriptor.clone(),
            data,
        })
    }
}

/// Decode every entry with default options.
pub fn decode(raw: &[u8]) -> Result<DecodeResult> {
    ArchiveDecoder::default().decode(raw)
}

/// Decode a single entry with default options.
pub fn decode_one(raw: &[u8], name: &str) -> Result<DecodedEntry> {
    ArchiveDecoder::default().decode_one(raw, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = DecodeOptions::new()
            .with_checksum_policy(ChecksumPolicy::Keep)
            .with_verify_checksums(false)
            .with_parallel(false)
            .with_max_entry_size(1024);

        assert_eq!(options.checksum_policy, ChecksumPolicy::Keep);
        assert!(!options.verify_checksums);
        assert!(!options.parallel);
        assert_eq!(options.max_entry_size, 1024);
        assert_eq!(options.params, LzssParams::ZUN);
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_failure_display() {
        let failure = EntryFailure {
            error: ZunError::checksum_mismatch(1, 2),
            salvaged: Some(vec![0; 5]),
        };
        assert!(failure.to_string().ends_with("(5 bytes salvaged)"));
    }

    #[test]
    fn test_decode_garbage_is_container_error() {
        let err = decode(b"not an archive at all").unwrap_err();
        assert!(err.is_container_error());
    }

    #[test]
    fn test_invalid_params_rejected_up_front() {
        let params = LzssParams {
            index_bits: 0,
            ..LzssParams::ZUN
        };
        let decoder = ArchiveDecoder::new(DecodeOptions::new().with_params(params));
        assert!(matches!(
            decoder.list(b"ZDAT"),
            Err(ZunError::InvalidParameters { .. })
        ));
    }
}
