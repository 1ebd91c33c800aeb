//! Local log file reading with automatic decompression.
//!
//! Event Log Files pulled down for archival are often compressed; this
//! opens `.gz` and `.zst` archives transparently so `--files` accepts them
//! next to plain CSVs.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Opens a local log file, decompressing by extension.
///
/// `.gz` → gzip, `.zst` → zstandard, anything else is read as-is.
pub fn open_log_file(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Ok(Box::new(GzDecoder::new(file))),
        Some("zst") => {
            let decoder = zstd::Decoder::new(file).with_context(|| {
                format!("Failed to create zstd decoder for: {}", path.display())
            })?;
            Ok(Box::new(decoder))
        }
        _ => Ok(Box::new(file)),
    }
}
