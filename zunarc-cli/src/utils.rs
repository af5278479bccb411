//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use zunarc_archive::EntryDescriptor;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Check if a name matches the filter patterns.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |pattern_str: &String| {
        Pattern::new(pattern_str)
            .map(|pattern| pattern.matches(name))
            .unwrap_or(false)
    };

    if exclude.iter().any(matches) {
        return false;
    }

    include.is_empty() || include.iter().any(matches)
}

/// Filter descriptors based on include/exclude patterns.
pub fn filter_entries<'a>(
    entries: &'a [EntryDescriptor],
    include: &[String],
    exclude: &[String],
) -> Vec<&'a EntryDescriptor> {
    entries
        .iter()
        .filter(|e| matches_filters(&e.name, include, exclude))
        .collect()
}

/// Print descriptors, either as bare names or as a table.
pub fn print_entries(entries: &[&EntryDescriptor], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.name);
        }
        return;
    }

    println!(
        "{:>10} {:>10} {:>6} {:>8} {:>8}  Name",
        "Size", "Packed", "Ratio", "Cipher", "CRC32"
    );
    println!("{}", "-".repeat(66));

    let mut total_size = 0u64;
    let mut total_packed = 0u64;

    for entry in entries {
        let ratio = if entry.is_stored() {
            "stored".to_string()
        } else {
            format!("{:.1}%", entry.ratio())
        };
        let crc = entry
            .checksum
            .map(|c| format!("{:08x}", c))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:>10} {:>10} {:>6} {:>8} {:>8}  {}",
            entry.decompressed_len,
            entry.compressed_len,
            ratio,
            entry.cipher.name(),
            crc,
            entry.name
        );

        total_size += entry.decompressed_len as u64;
        total_packed += entry.compressed_len as u64;
    }

    println!("{}", "-".repeat(66));
    println!(
        "{:>10} {:>10} {:>5.1}%                    {} entries",
        total_size,
        total_packed,
        percent(total_packed, total_size),
        entries.len()
    );
}

/// `part` as a percentage of `whole`.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

/// Resolve an entry name below `output`.
///
/// Backslashes count as separators. Returns `None` for absolute names and
/// names that climb out of `output`.
pub fn safe_output_path(output: &Path, name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let relative = Path::new(&normalized);

    let mut path = output.to_path_buf();
    let mut pushed = false;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    // Names like "C:foo" slip through on non-Windows hosts
    if normalized.contains(':') {
        return None;
    }

    pushed.then_some(path)
}

/// Write `data` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&Path>, data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => std::fs::write(path, data)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Parse an integer given in decimal or with a `0x` prefix.
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Parse a byte given in decimal or with a `0x` prefix.
pub fn parse_u8(s: &str) -> Result<u8, String> {
    let value = parse_u32(s)?;
    u8::try_from(value).map_err(|_| format!("'{}' does not fit in a byte", s))
}
