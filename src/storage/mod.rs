// src/storage/mod.rs
use crate::payslip::models::{ExtractedPayslip, Payslip, SkippedHead};
use crate::utils::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Destination for accepted records.
pub trait Importer {
    /// Persists `record`. With `overwrite`, replaces whatever is stored under
    /// `match_key`; otherwise always creates a fresh record.
    fn import<T: Serialize>(&mut self, record: &T, overwrite: bool, match_key: &str) -> Result<PathBuf, StorageError>;

    fn close(&mut self) -> Result<(), StorageError>;
}

/// What gets persisted for each accepted payslip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPayslip {
    pub payslip: Payslip,
    /// Head rows that were skipped during extraction.
    pub warnings: Vec<SkippedHead>,
    pub source: String,
    pub layout_version: Option<String>,
    pub imported_at: String,
}

impl StoredPayslip {
    pub fn new(extracted: ExtractedPayslip, source: &Path, layout_version: Option<&str>) -> Self {
        Self {
            payslip: extracted.payslip,
            warnings: extracted.warnings,
            source: source.display().to_string(),
            layout_version: layout_version.map(str::to_string),
            imported_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Stores each record as a pretty-printed JSON file under a base directory.
pub struct JsonStore {
    base_dir: PathBuf,
    imported: usize,
}

impl JsonStore {
    /// Creates a new JsonStore with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self {
            base_dir: base_path,
            imported: 0,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes `contents` to the first `<stem>-<n>.json` that does not exist yet.
    fn create_fresh(&self, stem: &str, contents: &[u8]) -> Result<PathBuf, StorageError> {
        let mut n = 1;
        loop {
            let path = self.base_dir.join(format!("{}-{}.json", stem, n));
            match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(StorageError::IoError(e)),
            }
        }
    }
}

/// Match keys become file names. Bytes outside `[A-Za-z0-9._]` (and a leading
/// `.`) are percent-escaped, so distinct keys never share a file and no stem
/// contains the `-` that separates fresh-record counters.
fn file_stem_for(match_key: &str) -> String {
    let mut stem = String::with_capacity(match_key.len());
    for (i, byte) in match_key.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'_' || (byte == b'.' && i > 0);
        if keep {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

impl Importer for JsonStore {
    fn import<T: Serialize>(&mut self, record: &T, overwrite: bool, match_key: &str) -> Result<PathBuf, StorageError> {
        let contents = serde_json::to_vec_pretty(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let stem = file_stem_for(match_key);

        let path = if overwrite {
            let path = self.base_dir.join(format!("{}.json", stem));
            fs::write(&path, &contents).map_err(StorageError::IoError)?;
            path
        } else {
            self.create_fresh(&stem, &contents)?
        };

        self.imported += 1;
        tracing::info!("Saved record {} to {}", match_key, path.display());
        Ok(path)
    }

    fn close(&mut self) -> Result<(), StorageError> {
        tracing::info!(
            "Closing store {} ({} records imported)",
            self.base_dir.display(),
            self.imported
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overwrite_replaces_the_matching_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path().join("payslips")).unwrap();

        let first = store.import(&json!({"net": 1}), true, "DOC-1").unwrap();
        let second = store.import(&json!({"net": 2}), true, "DOC-1").unwrap();
        assert_eq!(first, second);

        let stored: serde_json::Value = serde_json::from_slice(&fs::read(&second).unwrap()).unwrap();
        assert_eq!(stored["net"], 2);
        assert_eq!(fs::read_dir(store.base_dir()).unwrap().count(), 1);
        store.close().unwrap();
    }

    #[test]
    fn without_overwrite_every_import_is_a_fresh_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path()).unwrap();

        let first = store.import(&json!({"net": 1}), false, "DOC-1").unwrap();
        let second = store.import(&json!({"net": 1}), false, "DOC-1").unwrap();
        assert_ne!(first, second);
        assert_eq!(first.file_name().unwrap(), "DOC%2D1-1.json");
        assert_eq!(second.file_name().unwrap(), "DOC%2D1-2.json");
    }

    #[test]
    fn match_keys_are_made_safe_for_file_names() {
        assert_eq!(file_stem_for("ADV/2016 06"), "ADV%2F2016%2006");
        assert_eq!(file_stem_for("../etc"), "%2E.%2Fetc");
        assert_eq!(file_stem_for("DOC-1"), "DOC%2D1");
        assert_eq!(file_stem_for("100%"), "100%25");
    }

    #[test]
    fn keys_that_look_alike_keep_separate_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path()).unwrap();

        let slash = store.import(&json!({"doc": "ADV/1"}), true, "ADV/1").unwrap();
        let underscore = store.import(&json!({"doc": "ADV_1"}), true, "ADV_1").unwrap();
        assert_ne!(slash, underscore);

        let stored: serde_json::Value = serde_json::from_slice(&fs::read(&slash).unwrap()).unwrap();
        assert_eq!(stored["doc"], "ADV/1");
        assert_eq!(fs::read_dir(store.base_dir()).unwrap().count(), 2);
    }

    #[test]
    fn fresh_records_never_land_on_another_keys_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path()).unwrap();

        let fresh = store.import(&json!({"doc": "X"}), false, "X").unwrap();
        let upsert = store.import(&json!({"doc": "X-1"}), true, "X-1").unwrap();
        assert_ne!(fresh, upsert);

        let stored: serde_json::Value = serde_json::from_slice(&fs::read(&fresh).unwrap()).unwrap();
        assert_eq!(stored["doc"], "X");
    }
}
