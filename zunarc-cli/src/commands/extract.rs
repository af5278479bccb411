//! Extract command implementation.

use crate::utils::{create_progress_bar, matches_filters, safe_output_path};
use std::path::Path;
use tracing::warn;
use zunarc_archive::{ArchiveDecoder, ChecksumPolicy, DecodeOptions};

/// Options for extracting archive contents.
pub struct ExtractOptions<'a> {
    pub output: &'a Path,
    pub files: &'a [String],
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub verbose: bool,
    pub progress: bool,
    /// Write entries that fail their checksum anyway.
    pub keep_corrupt: bool,
}

pub fn cmd_extract(
    archive: &Path,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read(archive)?;
    let policy = if options.keep_corrupt {
        ChecksumPolicy::Keep
    } else {
        ChecksumPolicy::Discard
    };
    let decoder = ArchiveDecoder::new(DecodeOptions::new().with_checksum_policy(policy));

    println!(
        "Extracting {} to {}",
        archive.display(),
        options.output.display()
    );

    let should_extract = |name: &str| -> bool {
        if !options.files.is_empty() && !options.files.iter().any(|f| f == name) {
            return false;
        }
        matches_filters(name, options.include, options.exclude)
    };

    let result = decoder.decode(&raw)?;
    let selected: Vec<_> = result.iter().filter(|(name, _)| should_extract(*name)).collect();

    let pb = create_progress_bar(selected.len() as u64, options.progress);
    pb.set_message("entries");

    let mut written = 0usize;
    let mut failed = 0usize;

    for (name, outcome) in selected {
        pb.inc(1);

        let Some(path) = safe_output_path(options.output, name) else {
            warn!(entry = name, "refusing to write entry outside the output directory");
            pb.println(format!("  Skipped unsafe name: {}", name));
            failed += 1;
            continue;
        };

        let data = match outcome {
            Ok(entry) => &entry.data,
            Err(failure) => {
                failed += 1;
                pb.println(format!("  FAILED: {} - {}", name, failure.error));
                match &failure.salvaged {
                    Some(bytes) => {
                        pb.println(format!("  Keeping corrupt data for {}", name));
                        bytes
                    }
                    None => continue,
                }
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, data)?;
        written += 1;

        if options.verbose {
            pb.println(format!("  Extracted: {} ({} bytes)", name, data.len()));
        }
    }
    pb.finish_with_message("Done");

    println!("{} entries written", written);
    if failed > 0 {
        return Err(format!("{} entries could not be extracted cleanly", failed).into());
    }
    Ok(())
}
