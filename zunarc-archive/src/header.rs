//! ZDAT container header and entry directory.
//!
//! All integers are little-endian.
//!
//! ```text
//! +--------+---------+-------+-------------+----------------+
//! | "ZDAT" | version | flags | entry_count | directory_size |   16 bytes
//! +--------+---------+-------+-------------+----------------+
//! | entry descriptor 0 | entry descriptor 1 | ...  (directory_size bytes)
//! +------------------------------------------------------------
//! | entry payloads, located by absolute offset
//! ```
//!
//! Entry descriptor:
//!
//! ```text
//! u16 name_len | name | u32 offset | u32 compressed_len | u32 decompressed_len
//! u8 flags | [u32 crc32]           if ENTRY_HAS_CHECKSUM
//!          | [u8 kind, key data]   if ENTRY_ENCRYPTED
//! ```

use crate::crypto::Cipher;
use encoding_rs::SHIFT_JIS;
use std::ops::Range;
use zunarc_core::error::{Result, ZunError};
use zunarc_core::reader::ByteReader;

/// Container magic: "ZDAT"
pub const MAGIC: [u8; 4] = *b"ZDAT";

/// The only supported container version.
pub const VERSION: u16 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Entry flag: a CRC-32 of the decoded bytes follows the flags byte.
pub const ENTRY_HAS_CHECKSUM: u8 = 0x01;
/// Entry flag: the payload is encrypted and a cipher record follows.
pub const ENTRY_ENCRYPTED: u8 = 0x02;
/// All entry flags this version understands.
const ENTRY_KNOWN_FLAGS: u8 = ENTRY_HAS_CHECKSUM | ENTRY_ENCRYPTED;

/// Cipher kind: TH06 additive.
pub const CIPHER_ADDITIVE: u8 = 1;
/// Cipher kind: TH08+ block interleave.
pub const CIPHER_BLOCK: u8 = 2;

/// Smallest possible descriptor (empty name, no checksum, no cipher).
const MIN_DESCRIPTOR_SIZE: usize = 15;

/// Default upper bound on a single entry's declared decoded size (256 MiB).
pub const DEFAULT_MAX_ENTRY_SIZE: usize = 256 * 1024 * 1024;

/// Fixed-size container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Format version.
    pub version: u16,
    /// Reserved flags (always 0).
    pub flags: u16,
    /// Number of entry descriptors in the directory.
    pub entry_count: u32,
    /// Directory size in bytes.
    pub directory_size: u32,
}

impl ContainerHeader {
    /// Create a version 1 header.
    pub fn new(entry_count: u32, directory_size: u32) -> Self {
        Self {
            version: VERSION,
            flags: 0,
            entry_count,
            directory_size,
        }
    }

    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ZunError::truncated(HEADER_SIZE, data.len()));
        }

        let mut reader = ByteReader::new(data);
        let magic: [u8; 4] = reader.read_array()?;
        if magic != MAGIC {
            return Err(ZunError::invalid_magic(MAGIC, magic));
        }

        let version = reader.read_u16_le()?;
        if version != VERSION {
            return Err(ZunError::unsupported_version(version));
        }

        let flags = reader.read_u16_le()?;
        if flags != 0 {
            return Err(ZunError::malformed(format!(
                "reserved header flags set: {:#06x}",
                flags
            )));
        }

        Ok(Self {
            version,
            flags,
            entry_count: reader.read_u32_le()?,
            directory_size: reader.read_u32_le()?,
        })
    }

    /// Byte range of the directory within the container.
    ///
    /// Fails if the directory runs past `buffer_len`.
    pub fn directory_range(&self, buffer_len: usize) -> Result<Range<usize>> {
        let end = HEADER_SIZE
            .checked_add(self.directory_size as usize)
            .filter(|&end| end <= buffer_len)
            .ok_or_else(|| {
                ZunError::malformed(format!(
                    "directory of {} bytes extends past end of {}-byte container",
                    self.directory_size, buffer_len
                ))
            })?;
        Ok(HEADER_SIZE..end)
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6..8].copy_from_slice(&self.flags.to_le_bytes());
        out[8..12].copy_from_slice(&self.entry_count.to_le_bytes());
        out[12..16].copy_from_slice(&self.directory_size.to_le_bytes());
        out
    }
}

/// Directory record describing one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// Entry name.
    pub name: String,
    /// Absolute payload offset.
    pub offset: u32,
    /// Payload size as stored.
    pub compressed_len: u32,
    /// Size after decoding.
    pub decompressed_len: u32,
    /// CRC-32 of the decoded bytes.
    pub checksum: Option<u32>,
    /// Payload cipher.
    pub cipher: Cipher,
}

impl EntryDescriptor {
    /// Whether the payload is stored without LZSS.
    ///
    /// ZUN marks stored entries by equal compressed and decoded sizes.
    pub fn is_stored(&self) -> bool {
        self.compressed_len == self.decompressed_len
    }

    /// Whether the payload is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.cipher != Cipher::None
    }

    /// Byte range of the payload within the container.
    pub fn payload_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.compressed_len as usize
    }

    /// Compressed size as a percentage of the decoded size.
    pub fn ratio(&self) -> f64 {
        if self.decompressed_len == 0 {
            return 100.0;
        }
        self.compressed_len as f64 * 100.0 / self.decompressed_len as f64
    }

    /// Flags byte as written in the directory.
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.checksum.is_some() {
            flags |= ENTRY_HAS_CHECKSUM;
        }
        if self.is_encrypted() {
            flags |= ENTRY_ENCRYPTED;
        }
        flags
    }

    /// Read one descriptor. Bounds against the container are not checked
    /// here.
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let name_len = reader.read_u16_le()? as usize;
        let name = decode_name(reader.read_bytes(name_len)?);
        let offset = reader.read_u32_le()?;
        let compressed_len = reader.read_u32_le()?;
        let decompressed_len = reader.read_u32_le()?;

        let flags = reader.read_u8()?;
        if flags & !ENTRY_KNOWN_FLAGS != 0 {
            return Err(ZunError::malformed(format!(
                "entry '{}' has unknown flags {:#04x}",
                name, flags
            )));
        }

        let checksum = if flags & ENTRY_HAS_CHECKSUM != 0 {
            Some(reader.read_u32_le()?)
        } else {
            None
        };

        let cipher = if flags & ENTRY_ENCRYPTED != 0 {
            match reader.read_u8()? {
                CIPHER_ADDITIVE => Cipher::Additive {
                    key: reader.read_u8()?,
                },
                CIPHER_BLOCK => Cipher::Block {
                    block_size: reader.read_u32_le()?,
                    base: reader.read_u8()?,
                    add: reader.read_u8()?,
                },
                kind => {
                    return Err(ZunError::malformed(format!(
                        "entry '{}' uses unknown cipher kind {}",
                        name, kind
                    )));
                }
            }
        } else {
            Cipher::None
        };

        Ok(Self {
            name,
            offset,
            compressed_len,
            decompressed_len,
            checksum,
            cipher,
        })
    }

    /// Append the serialized descriptor to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let name = encode_name(&self.name);
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&name);
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.compressed_len.to_le_bytes());
        out.extend_from_slice(&self.decompressed_len.to_le_bytes());
        out.push(self.flags());

        if let Some(crc) = self.checksum {
            out.extend_from_slice(&crc.to_le_bytes());
        }

        match self.cipher {
            Cipher::None => {}
            Cipher::Additive { key } => {
                out.push(CIPHER_ADDITIVE);
                out.push(key);
            }
            Cipher::Block {
                block_size,
                base,
                add,
            } => {
                out.push(CIPHER_BLOCK);
                out.extend_from_slice(&block_size.to_le_bytes());
                out.push(base);
                out.push(add);
            }
        }
    }

    /// Check the descriptor against the container it came from.
    fn validate(&self, buffer_len: usize, max_entry_size: usize) -> Result<()> {
        let end = (self.offset as usize).checked_add(self.compressed_len as usize);
        if end.is_none_or(|end| end > buffer_len) {
            return Err(ZunError::malformed(format!(
                "entry '{}' payload at {}+{} extends past end of {}-byte container",
                self.name, self.offset, self.compressed_len, buffer_len
            )));
        }

        if self.decompressed_len as usize > max_entry_size {
            return Err(ZunError::malformed(format!(
                "entry '{}' declares {} decoded bytes, limit is {}",
                self.name, self.decompressed_len, max_entry_size
            )));
        }

        Ok(())
    }
}

/// Parsed header plus directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Fixed header.
    pub header: ContainerHeader,
    /// Descriptors in directory order.
    pub entries: Vec<EntryDescriptor>,
}

impl Container {
    /// Parse the header and directory with the default entry size limit.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_limit(data, DEFAULT_MAX_ENTRY_SIZE)
    }

    /// Parse the header and directory.
    ///
    /// Every descriptor is checked against the buffer before any payload
    /// is touched, so a malformed directory fails the whole container.
    pub fn parse_with_limit(data: &[u8], max_entry_size: usize) -> Result<Self> {
        let header = ContainerHeader::parse(data)?;
        let directory = &data[header.directory_range(data.len())?];

        let count = header.entry_count as usize;
        let mut entries = Vec::with_capacity(count.min(directory.len() / MIN_DESCRIPTOR_SIZE));
        let mut reader = ByteReader::new(directory);

        for index in 0..count {
            let entry = EntryDescriptor::read(&mut reader).map_err(|e| match e {
                ZunError::TruncatedInput { .. } => ZunError::malformed(format!(
                    "descriptor {} of {} does not fit in the {}-byte directory",
                    index,
                    count,
                    directory.len()
                )),
                other => other,
            })?;
            entry.validate(data.len(), max_entry_size)?;
            entries.push(entry);
        }

        Ok(Self { header, entries })
    }

    /// Sum of declared decoded sizes.
    pub fn total_decompressed(&self) -> u64 {
        self.entries.iter().map(|e| e.decompressed_len as u64).sum()
    }

    /// Sum of stored payload sizes.
    pub fn total_compressed(&self) -> u64 {
        self.entries.iter().map(|e| e.compressed_len as u64).sum()
    }
}

/// Decode an entry name (Shift_JIS, falling back to lossy UTF-8).
fn decode_name(bytes: &[u8]) -> String {
    let (decoded, _, had_errors) = SHIFT_JIS.decode(bytes);
    if !had_errors {
        return decoded.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encode an entry name as Shift_JIS.
fn encode_name(name: &str) -> Vec<u8> {
    let (encoded, _, had_errors) = SHIFT_JIS.encode(name);
    if had_errors {
        return name.as_bytes().to_vec();
    }
    encoded.into_owned()
}
