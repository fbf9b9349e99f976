use crate::constants::{FAILURE_STORE_FILENAME, FAILURE_STORE_TEMP_FILENAME};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

/// A file that failed to compress, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFileRecord {
    pub file: PathBuf,
    pub error: String,
}

impl FailedFileRecord {
    pub fn new(file: PathBuf, error: String) -> Self {
        Self { file, error }
    }
}

/// Contents of the failure store file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDocument {
    pub timestamp: DateTime<Utc>,
    pub files: Vec<FailedFileRecord>,
}

impl FailureDocument {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|r| r.file.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Remembers which files failed in the most recent run.
///
/// Holds at most one document; every save replaces it wholesale.
#[derive(Debug, Clone)]
pub struct FailureStore {
    dir: PathBuf,
}

impl FailureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the process working directory.
    pub fn in_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(FAILURE_STORE_FILENAME)
    }

    /// Replaces any existing document with `records`.
    pub fn save(&self, records: &[FailedFileRecord]) -> Result<()> {
        let document = FailureDocument {
            timestamp: Utc::now(),
            files: records.to_vec(),
        };
        let temp_path = self.dir.join(FAILURE_STORE_TEMP_FILENAME);

        // Write to temp file first, then rename for atomicity
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;

        fs::rename(&temp_path, self.path())?;
        Ok(())
    }

    /// Loads the document, treating a missing or corrupt file as "no failures".
    pub fn load(&self) -> Option<FailureDocument> {
        let path = self.path();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                crate::warn!("Cannot read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(document) => Some(document),
            Err(e) => {
                crate::warn!("Ignoring unreadable {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(file: &str, error: &str) -> FailedFileRecord {
        FailedFileRecord::new(PathBuf::from(file), error.to_string())
    }

    #[test]
    fn test_load_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FailureStore::new(temp_dir.path());
        assert!(store.load().is_none());
        assert!(!store.exists());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FailureStore::new(temp_dir.path());
        let records = vec![record("a.jpg", "timeout"), record("img/b.png", "bad json")];

        store.save(&records).unwrap();
        let document = store.load().unwrap();
        assert_eq!(document.files, records);
        assert_eq!(
            document.paths(),
            vec![PathBuf::from("a.jpg"), PathBuf::from("img/b.png")]
        );
        assert!(!temp_dir.path().join(FAILURE_STORE_TEMP_FILENAME).exists());
    }

    #[test]
    fn test_save_overwrites_previous_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = FailureStore::new(temp_dir.path());

        store.save(&[record("old.jpg", "first run")]).unwrap();
        store.save(&[record("new.jpg", "second run")]).unwrap();

        let document = store.load().unwrap();
        assert_eq!(document.files, vec![record("new.jpg", "second run")]);
    }

    #[test]
    fn test_document_wire_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = FailureStore::new(temp_dir.path());
        store.save(&[record("a.jpg", "boom")]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["timestamp"].is_string());
        assert_eq!(value["files"][0]["file"], "a.jpg");
        assert_eq!(value["files"][0]["error"], "boom");
    }

    #[test]
    fn test_load_corrupt_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FailureStore::new(temp_dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FailureStore::new(temp_dir.path());
        store.save(&[record("a.jpg", "boom")]).unwrap();
        assert!(store.exists());

        store.clear().unwrap();
        assert!(!store.exists());
        // clearing twice is fine
        store.clear().unwrap();
    }
}
