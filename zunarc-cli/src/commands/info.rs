//! Info command implementation.

use crate::utils::percent;
use std::path::Path;
use zunarc_archive::{ArchiveDecoder, Cipher, DecodeOptions};

pub fn cmd_info(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read(archive)?;
    let container = ArchiveDecoder::new(DecodeOptions::default()).list(&raw)?;
    let header = &container.header;
    let entries = &container.entries;

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Format: ZDAT version {}", header.version);
    println!("Size: {} bytes", raw.len());
    println!("Directory: {} bytes", header.directory_size);

    let total_size = container.total_decompressed();
    let total_packed = container.total_compressed();
    let count = |pred: fn(&Cipher) -> bool| entries.iter().filter(|e| pred(&e.cipher)).count();

    println!();
    println!("Contents:");
    println!("  Entries: {}", entries.len());
    println!(
        "  Stored: {}",
        entries.iter().filter(|e| e.is_stored()).count()
    );
    println!(
        "  With checksum: {}",
        entries.iter().filter(|e| e.checksum.is_some()).count()
    );
    println!(
        "  Additive cipher: {}",
        count(|c| matches!(c, Cipher::Additive { .. }))
    );
    println!(
        "  Block cipher: {}",
        count(|c| matches!(c, Cipher::Block { .. }))
    );
    println!("  Total size: {} bytes", total_size);
    println!("  Packed size: {} bytes", total_packed);
    if total_size > 0 {
        println!(
            "  Compression ratio: {:.1}%",
            100.0 - percent(total_packed, total_size)
        );
    }

    Ok(())
}
