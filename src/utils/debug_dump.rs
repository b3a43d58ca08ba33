// src/utils/debug_dump.rs
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding debug artifacts for one document: `<base>/<document stem>/`.
pub fn document_debug_dir(base: &Path, document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    base.join(stem)
}

/// Saves the raw tool output of one section as `<section>.csv`.
pub fn save_section_dump(dir: &Path, section: &str, raw: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", section));
    fs::write(&path, raw)?;
    tracing::debug!("Saved raw {} output to {}", section, path.display());
    Ok(path)
}

/// Writes `extraction_failure.txt` describing why a document was rejected.
pub fn save_failure_report(dir: &Path, document: &Path, error: &dyn std::error::Error) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("extraction_failure.txt");
    let mut report = format!("Failed to extract payslip from {}: {}\n", document.display(), error);
    let mut source = error.source();
    while let Some(cause) = source {
        report.push_str(&format!("  caused by: {}\n", cause));
        source = cause.source();
    }
    fs::write(&path, report)?;
    tracing::info!("Saved failure report to {}", path.display());
    Ok(path)
}
