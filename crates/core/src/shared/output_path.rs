use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Inserts `suffix` between the file stem and its extension.
///
/// `scans/brain.png` + `_processed` → `scans/brain_processed.png`. Only the
/// last extension is considered, so dots elsewhere in the path are kept.
/// A path without an extension gets the suffix appended.
pub fn derive_output_path(original: &Path, suffix: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();

    let mut file_name = OsString::from(stem);
    file_name.push(suffix);
    if let Some(ext) = original.extension() {
        file_name.push(".");
        file_name.push(ext);
    }

    original.with_file_name(file_name)
}
