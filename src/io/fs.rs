use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Write-then-rename, so a failed run never leaves a truncated output behind.
/// Returns the number of bytes written.
pub(crate) fn write_atomic(target: &Path, bytes: &[u8]) -> Result<u64> {
    let parent = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("[io::fs] create dir {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .context("[io::fs] create temp file")?;
    tmp.write_all(bytes)
        .with_context(|| format!("[io::fs] write temp file for {}", target.display()))?;
    tmp.as_file().sync_all().ok(); // best-effort fsync file
    tmp.persist(target)
        .with_context(|| format!("[io::fs] rename to {}", target.display()))?;

    let _ = File::open(parent).and_then(|f| f.sync_all());

    Ok(bytes.len() as u64)
}

/// `input` with its `.csv` extension swapped for `suffix` (or `suffix` appended).
pub(crate) fn derive_output_path(input: &Path, suffix: &str) -> std::path::PathBuf {
    let text = input.to_string_lossy();
    match text.strip_suffix(".csv") {
        Some(stem) => format!("{stem}{suffix}").into(),
        None => format!("{text}{suffix}").into(),
    }
}
