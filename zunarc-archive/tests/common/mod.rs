//! In-memory ZDAT fixture builder shared by the integration tests.

#![allow(dead_code)]

use zunarc_archive::crypto::Cipher;
use zunarc_archive::header::{ContainerHeader, EntryDescriptor, HEADER_SIZE};
use zunarc_core::Crc32;

/// One entry as it will be written.
struct Fixture {
    name: String,
    payload: Vec<u8>,
    decompressed_len: u32,
    checksum: Option<u32>,
    cipher: Cipher,
}

/// Assembles ZDAT containers for tests.
#[derive(Default)]
pub struct ArchiveBuilder {
    fixtures: Vec<Fixture>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// LZSS-compressed entry with a correct checksum.
    pub fn add(self, name: &str, data: &[u8]) -> Self {
        let crc = Crc32::compute(data);
        self.add_with_checksum(name, data, Some(crc))
    }

    /// LZSS-compressed entry with an explicit (possibly wrong) checksum.
    pub fn add_with_checksum(self, name: &str, data: &[u8], checksum: Option<u32>) -> Self {
        let mut payload = zunarc_lzss::compress(data);
        // Equal sizes mean "stored", so fall back to storing
        if payload.len() == data.len() {
            payload = data.to_vec();
        }
        self.add_raw(name, payload, data.len() as u32, checksum, Cipher::None)
    }

    /// Entry stored without compression.
    pub fn add_stored(self, name: &str, data: &[u8]) -> Self {
        let crc = Crc32::compute(data);
        self.add_raw(name, data.to_vec(), data.len() as u32, Some(crc), Cipher::None)
    }

    /// Compressed entry encrypted with `cipher`.
    pub fn add_encrypted(self, name: &str, data: &[u8], cipher: Cipher) -> Self {
        let mut payload = zunarc_lzss::compress(data);
        if payload.len() == data.len() {
            payload = data.to_vec();
        }
        cipher
            .encrypt(&mut payload)
            .expect("fixture cipher parameters are valid");
        let crc = Crc32::compute(data);
        self.add_raw(name, payload, data.len() as u32, Some(crc), cipher)
    }

    /// Entry with a hand-made payload.
    pub fn add_raw(
        mut self,
        name: &str,
        payload: Vec<u8>,
        decompressed_len: u32,
        checksum: Option<u32>,
        cipher: Cipher,
    ) -> Self {
        self.fixtures.push(Fixture {
            name: name.to_string(),
            payload,
            decompressed_len,
            checksum,
            cipher,
        });
        self
    }

    /// Serialize header, directory and payloads.
    pub fn build(&self) -> Vec<u8> {
        let mut descriptors: Vec<EntryDescriptor> = self
            .fixtures
            .iter()
            .map(|f| EntryDescriptor {
                name: f.name.clone(),
                offset: 0,
                compressed_len: f.payload.len() as u32,
                decompressed_len: f.decompressed_len,
                checksum: f.checksum,
                cipher: f.cipher,
            })
            .collect();

        // Descriptor size does not depend on the offset value
        let mut directory = Vec::new();
        for d in &descriptors {
            d.write_to(&mut directory);
        }

        let mut offset = HEADER_SIZE + directory.len();
        for (d, f) in descriptors.iter_mut().zip(&self.fixtures) {
            d.offset = offset as u32;
            offset += f.payload.len();
        }

        directory.clear();
        for d in &descriptors {
            d.write_to(&mut directory);
        }

        let header = ContainerHeader::new(descriptors.len() as u32, directory.len() as u32);
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(&directory);
        for f in &self.fixtures {
            out.extend_from_slice(&f.payload);
        }
        out
    }
}

/// Overwrite the header's directory size.
pub fn set_directory_size(archive: &mut [u8], size: u32) {
    archive[12..16].copy_from_slice(&size.to_le_bytes());
}

/// Read the header's directory size.
pub fn directory_size(archive: &[u8]) -> u32 {
    u32::from_le_bytes([archive[12], archive[13], archive[14], archive[15]])
}

/// Text with no repeated 3-byte sequence, so it compresses to literals only.
pub fn all_literals() -> Vec<u8> {
    b"ZUN Soft: the Embodiment of Scarlet Devil".to_vec()
}

/// Mixed content long enough to slide the window.
pub fn script_like(len: usize) -> Vec<u8> {
    let words: [&[u8]; 6] = [b"ins_12 ", b"wait 30; ", b"bullet(", b"0x1b, ", b"); ", b"\r\n"];
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[(i * 7 + i / 5) % words.len()]);
        out.push((i % 251) as u8);
        i += 1;
    }
    out.truncate(len);
    out
}
