use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::Fingerprint;
use crate::errors::FeederResult;
use crate::storage::json_file;
use crate::storage::traits::DedupStore;

/// Dedup store backed by a JSON array of fingerprint strings.
///
/// Entries are never evicted, so the file grows with every story seen.
pub struct JsonDedupStore {
    path: PathBuf,
    seen: BTreeSet<Fingerprint>,
}

impl JsonDedupStore {
    /// Open the store and load whatever is on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let seen = Self::read(&path);
        Self { path, seen }
    }

    /// Read the persisted set; missing, blank or corrupt files give an empty set
    pub fn read(path: &Path) -> BTreeSet<Fingerprint> {
        match json_file::read::<Vec<Fingerprint>>(path) {
            Ok(Some(list)) => list.into_iter().collect(),
            Ok(None) => {
                warn!(path = %path.display(), "no dedup state yet, starting empty");
                BTreeSet::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable dedup store, starting empty");
                BTreeSet::new()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fingerprints(&self) -> &BTreeSet<Fingerprint> {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl DedupStore for JsonDedupStore {
    fn load(&mut self) {
        self.seen = Self::read(&self.path);
    }

    fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    fn add(&mut self, fingerprint: Fingerprint) {
        self.seen.insert(fingerprint);
    }

    fn persist(&self) -> FeederResult<()> {
        // BTreeSet iterates in sorted order, so output is deterministic
        json_file::write_atomic(&self.path, &self.seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonDedupStore {
        JsonDedupStore::open(dir.path().join("news_cache.json"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_and_corrupt_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news_cache.json");

        fs::write(&path, "   \n").unwrap();
        assert!(JsonDedupStore::open(&path).is_empty());

        fs::write(&path, "{not json").unwrap();
        assert!(JsonDedupStore::open(&path).is_empty());

        fs::write(&path, r#"{"h1": true}"#).unwrap();
        assert!(JsonDedupStore::open(&path).is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn warnings_while(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_missing_blank_and_corrupt_files_warn() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news_cache.json");

        let missing = warnings_while(|| {
            JsonDedupStore::open(&path);
        });
        assert!(missing.contains("WARN"), "{}", missing);

        fs::write(&path, "\n").unwrap();
        let blank = warnings_while(|| {
            JsonDedupStore::open(&path);
        });
        assert!(blank.contains("starting empty"), "{}", blank);

        fs::write(&path, "[1, 2").unwrap();
        let corrupt = warnings_while(|| {
            JsonDedupStore::open(&path);
        });
        assert!(corrupt.contains("unreadable dedup store"), "{}", corrupt);
    }

    #[test]
    fn test_loads_existing_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news_cache.json");
        fs::write(&path, r#"["h1", "h2"]"#).unwrap();

        let store = JsonDedupStore::open(&path);
        assert_eq!(store.len(), 2);
        assert!(store.contains(&Fingerprint::from("h1")));
        assert!(!store.contains(&Fingerprint::from("h3")));
    }

    #[test]
    fn test_add_is_in_memory_until_persist() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add(Fingerprint::from("h1"));
        assert!(store.contains(&Fingerprint::from("h1")));
        assert!(!store.path().exists());

        store.persist().unwrap();
        assert!(JsonDedupStore::read(store.path()).contains(&Fingerprint::from("h1")));
    }

    #[test]
    fn test_persist_is_sorted_pretty_array() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(Fingerprint::from("b"));
        store.add(Fingerprint::from("a"));
        store.persist().unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "[\n  \"a\",\n  \"b\"\n]\n");
    }

    #[test]
    fn test_persist_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news_cache.json");
        fs::write(&path, r#"["z", "x", "y", "x"]"#).unwrap();

        let mut store = JsonDedupStore::open(&path);
        store.persist().unwrap();
        let first = fs::read_to_string(&path).unwrap();

        store.load();
        store.persist().unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(JsonDedupStore::read(&path).len(), 3);
    }

    #[test]
    fn test_load_discards_unpersisted_additions() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(Fingerprint::from("transient"));

        store.load();
        assert!(store.is_empty());
    }
}
