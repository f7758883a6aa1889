//! Filesystem-backed checkpoint store: one encoded WorkingSet per chain key.
//!
//! - `exists` is a fresh probe every call; nothing is cached in memory
//! - records are written to a temp file and renamed into place, so a
//!   present record is always a complete one
//! - a missing record reads as `None`, never as an error
use pixicog_codec::{decode, encode, WorkingSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::RunnerConfig;
use crate::error::{PixicogError, Result};
use crate::hash_chain::Digest;

/// Storage location of the checkpoint for one chain value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    chain: Digest,
    path: PathBuf,
}

impl StoreKey {
    pub fn chain(&self) -> &Digest {
        &self.chain
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
    extension: String,
}

impl CheckpointStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.cache_dir.clone(), config.extension.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<chain-hex>.<extension>`
    pub fn key_of(&self, chain: &Digest) -> StoreKey {
        StoreKey {
            chain: *chain,
            path: self.root.join(format!("{}.{}", chain, self.extension)),
        }
    }

    pub fn exists(&self, key: &StoreKey) -> bool {
        let found = fs::metadata(&key.path)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        debug!(key = %key, found, "Probed checkpoint");
        found
    }

    /// Persist `ws` under `key`, replacing any existing record.
    pub fn write(&self, key: &StoreKey, ws: &WorkingSet) -> Result<()> {
        let text = encode(ws)?;
        let temp_path = self.root.join(format!("{}.{}.tmp", key.chain, self.extension));

        fs::write(&temp_path, text.as_bytes())
            .map_err(|e| PixicogError::io("write checkpoint", &temp_path, e))?;

        if let Err(e) = fs::rename(&temp_path, &key.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PixicogError::io("rename checkpoint into", &key.path, e));
        }

        debug!(key = %key, bytes = text.len(), entries = ws.len(), "Checkpoint written");
        Ok(())
    }

    /// Load the record under `key`, or `None` if there is none.
    pub fn read(&self, key: &StoreKey) -> Result<Option<WorkingSet>> {
        let bytes = match fs::read(&key.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key = %key, "No checkpoint to read");
                return Ok(None);
            }
            Err(e) => return Err(PixicogError::io("read checkpoint", &key.path, e)),
        };

        let text = String::from_utf8(bytes).map_err(|e| PixicogError::CorruptCheckpoint {
            path: key.path.clone(),
            reason: format!("not UTF-8: {}", e),
            source: None,
        })?;

        let ws = decode(&text).map_err(|e| PixicogError::CorruptCheckpoint {
            path: key.path.clone(),
            reason: e.to_string(),
            source: Some(e),
        })?;

        debug!(key = %key, entries = ws.len(), "Checkpoint read");
        Ok(Some(ws))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_chain::{extend, fingerprint};
    use pixicog_codec::{Image, Rgba};
    use tempfile::TempDir;

    fn sample() -> WorkingSet {
        let mut ws = WorkingSet::new();
        ws.insert(
            "one",
            vec![
                Image::filled(1, 1, Rgba::WHITE),
                Image::filled(1, 1, Rgba::BLACK),
                Image::filled(1, 1, Rgba::new(128, 128, 128, 255)),
            ],
        );
        ws
    }

    #[test]
    fn test_key_naming() {
        let store = CheckpointStore::new("cache", "pgs");
        let chain = extend(&fingerprint(&["hi"]), &Digest::of(b"f1"));
        let key = store.key_of(&chain);
        assert_eq!(key.path(), Path::new("cache").join(format!("{}.pgs", chain)));
        assert_eq!(key.chain(), &chain);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path(), "pgs");
        let key = store.key_of(&Digest::of(b"k"));

        assert!(!store.exists(&key));
        assert!(store.read(&key).unwrap().is_none());

        store.write(&key, &sample()).unwrap();
        assert!(store.exists(&key));
        assert_eq!(store.read(&key).unwrap(), Some(sample()));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_exists_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path(), "pgs");
        let key = store.key_of(&Digest::of(b"k"));

        store.write(&key, &WorkingSet::new()).unwrap();
        assert!(store.exists(&key));
        fs::remove_file(key.path()).unwrap();
        assert!(!store.exists(&key));
    }

    #[test]
    fn test_directory_is_not_a_checkpoint() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path(), "pgs");
        let key = store.key_of(&Digest::of(b"k"));
        fs::create_dir(key.path()).unwrap();
        assert!(!store.exists(&key));
    }

    #[test]
    fn test_corrupt_record() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path(), "pgs");
        let key = store.key_of(&Digest::of(b"k"));

        fs::write(key.path(), "one,1|1|4\n").unwrap();
        let err = store.read(&key).unwrap_err();
        assert!(matches!(err, PixicogError::CorruptCheckpoint { source: Some(_), .. }));

        fs::write(key.path(), [0xff, 0xfe, b'\n']).unwrap();
        let err = store.read(&key).unwrap_err();
        assert!(matches!(err, PixicogError::CorruptCheckpoint { source: None, .. }));
    }

    #[test]
    fn test_write_into_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("missing"), "pgs");
        let key = store.key_of(&Digest::of(b"k"));

        let err = store.write(&key, &sample()).unwrap_err();
        assert!(matches!(err, PixicogError::StoreIo { .. }));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_unencodable_set_is_format_error() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path(), "pgs");
        let key = store.key_of(&Digest::of(b"k"));
        let mut ws = WorkingSet::new();
        ws.insert("a,b", Vec::new());

        assert!(matches!(store.write(&key, &ws), Err(PixicogError::Format(_))));
        assert!(!store.exists(&key));
    }
}
