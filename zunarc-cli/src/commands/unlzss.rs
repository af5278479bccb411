//! Raw LZSS stream decompression.

use crate::utils::write_output;
use std::path::Path;
use tracing::info;

/// Decompress a bare ZUN LZSS stream.
///
/// With `size` the stream must produce exactly that many bytes; without
/// it, decoding runs to the end-of-stream marker.
pub fn cmd_unlzss(
    input: &Path,
    output: Option<&Path>,
    size: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read(input)?;

    let data = match size {
        Some(size) => zunarc_lzss::decompress(&raw, size)?,
        None => zunarc_lzss::decompress_unbounded(&raw)?,
    };
    info!(input = raw.len(), output = data.len(), "decompressed stream");

    write_output(output, &data)
}
