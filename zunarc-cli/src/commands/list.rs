//! List command implementation.

use crate::utils::{filter_entries, print_entries};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zunarc_archive::{ArchiveDecoder, DecodeOptions, EntryDescriptor};

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    offset: u32,
    size: u32,
    compressed_size: u32,
    ratio: f64,
    stored: bool,
    cipher: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    crc: Option<u32>,
}

impl EntryJson {
    fn from_descriptor(entry: &EntryDescriptor) -> Self {
        Self {
            name: entry.name.clone(),
            offset: entry.offset,
            size: entry.decompressed_len,
            compressed_size: entry.compressed_len,
            ratio: entry.ratio(),
            stored: entry.is_stored(),
            cipher: entry.cipher.name().to_string(),
            crc: entry.checksum,
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    format: String,
    version: u16,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(archive: &Path, options: &ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read(archive)?;
    let container = ArchiveDecoder::new(DecodeOptions::default()).list(&raw)?;
    let filtered = filter_entries(&container.entries, options.include, options.exclude);

    if options.json {
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            format: "ZDAT".to_string(),
            version: container.header.version,
            entries: filtered
                .iter()
                .map(|e| EntryJson::from_descriptor(e))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Archive: {} (ZDAT v{})", archive.display(), container.header.version);
    println!();
    print_entries(&filtered, options.verbose);
    Ok(())
}
