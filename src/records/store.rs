//! Flat-file JSON document store
//!
//! A document is one JSON object mapping slug → record. Reads tolerate a
//! missing or blank file (empty document); anything else that is not an
//! object of records is a hard `CorruptStore` error.
//!
//! Writes go to a sibling temporary file which is then renamed over the
//! target, so readers never observe a half-written document.
//!
//! `mutate` holds a per-path async mutex across load → change → save, which
//! serializes writers inside this process. Separate processes sharing the
//! file still race at full-document granularity (last writer wins).

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Records keyed by slug, serialized in key order
pub type Document<T> = BTreeMap<String, T>;

/// JSON document store for records of type `T`
pub struct RecordStore<T> {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open a store for the document at `path` (the file need not exist)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = path_lock(&path);
        Self {
            path,
            lock,
            _record: PhantomData,
        }
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document
    pub async fn load(&self) -> Result<Document<T>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };
        parse_document(&data, &self.path)
    }

    /// Replace the whole document on disk
    pub async fn save(&self, document: &Document<T>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write(document).await
    }

    /// Load, apply `f`, and save under the path lock.
    ///
    /// Nothing is written when `f` fails. When the write fails the change is
    /// dropped along with the in-memory document and the error is returned.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Document<T>) -> Result<R>,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let out = f(&mut document)?;
        self.write(&document).await?;
        Ok(out)
    }

    async fn write(&self, document: &Document<T>) -> Result<()> {
        let mut json = serde_json::to_string_pretty(document)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes()).await?;
        tracing::debug!(path = %self.path.display(), records = document.len(), "Document saved");
        Ok(())
    }
}

fn parse_document<T: DeserializeOwned>(data: &str, path: &Path) -> Result<Document<T>> {
    if data.trim().is_empty() {
        return Ok(Document::new());
    }

    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| Error::CorruptStore(format!("{}: {}", path.display(), e)))?;

    match value {
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| Error::CorruptStore(format!("{}: {}", path.display(), e))),
        // An empty mapping serialized as an empty list by older writers
        serde_json::Value::Array(items) if items.is_empty() => Ok(Document::new()),
        other => Err(Error::CorruptStore(format!(
            "{}: expected an object at top level, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Write `bytes` to a temporary sibling and rename it over `path`
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = tmp_path(path);
    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    result
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Process-wide mutex for a document path
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks.entry(path.to_path_buf()).or_default().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    fn make_store() -> (RecordStore<Note>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("notes.json"));
        (store, dir)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (store, _dir) = make_store();
        assert!(store.load().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_blank_file_is_empty() {
        let (store, _dir) = make_store();
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_array_is_empty() {
        let (store, _dir) = make_store();
        std::fs::write(store.path(), "[]").unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_is_corrupt() {
        let (store, _dir) = make_store();
        for content in ["\"hello\"", "42", "[1, 2]", "null", "{not json"] {
            std::fs::write(store.path(), content).unwrap();
            let result = store.load().await;
            assert!(
                matches!(result, Err(Error::CorruptStore(_))),
                "content {:?} should be corrupt",
                content
            );
        }
    }

    #[tokio::test]
    async fn test_undecodable_record_is_corrupt() {
        let (store, _dir) = make_store();
        std::fs::write(store.path(), r#"{"a": {"text": 5}}"#).unwrap();
        assert!(matches!(store.load().await, Err(Error::CorruptStore(_))));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (store, _dir) = make_store();
        let mut doc = Document::new();
        doc.insert("b".to_string(), note("second"));
        doc.insert("a".to_string(), note("first"));
        store.save(&doc).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, doc);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  \"a\": {"), "pretty-printed: {}", raw);
        assert!(raw.find("\"a\"").unwrap() < raw.find("\"b\"").unwrap());
    }

    #[tokio::test]
    async fn test_round_trip_untouched_document() {
        let (store, _dir) = make_store();
        std::fs::write(
            store.path(),
            r#"{"z":{"text":"last"},"m":{"text":"middle"}}"#,
        )
        .unwrap();

        let first = store.load().await.unwrap();
        store.save(&first).await.unwrap();
        let second = store.load().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store: RecordStore<Note> = RecordStore::new(dir.path().join("nested/deeper/notes.json"));
        store.save(&Document::new()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_save_leaves_no_tmp_file() {
        let (store, dir) = make_store();
        let mut doc = Document::new();
        doc.insert("a".to_string(), note("x"));
        store.save(&doc).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["notes.json".to_string()]);
    }

    #[tokio::test]
    async fn test_save_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let store: RecordStore<Note> = RecordStore::new(blocker.join("notes.json"));
        let result = store.save(&Document::new()).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_mutate_persists() {
        let (store, _dir) = make_store();
        let len = store
            .mutate(|doc| {
                doc.insert("a".to_string(), note("hello"));
                Ok(doc.len())
            })
            .await
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.load().await.unwrap()["a"], note("hello"));
    }

    #[tokio::test]
    async fn test_mutate_error_writes_nothing() {
        let (store, _dir) = make_store();
        let result: Result<()> = store
            .mutate(|doc| {
                doc.insert("a".to_string(), note("discarded"));
                Err(Error::Validation("nope".to_string()))
            })
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_mutate_on_corrupt_document_fails() {
        let (store, _dir) = make_store();
        std::fs::write(store.path(), "\"oops\"").unwrap();
        let result = store.mutate(|doc| Ok(doc.len())).await;
        assert!(matches!(result, Err(Error::CorruptStore(_))));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "\"oops\"");
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");

        let mut handles = Vec::new();
        for i in 0..20 {
            // A separate store per task still shares the per-path lock
            let store: RecordStore<Note> = RecordStore::new(path.clone());
            handles.push(tokio::spawn(async move {
                store
                    .mutate(|doc| {
                        doc.insert(format!("note-{}", i), note("x"));
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let store: RecordStore<Note> = RecordStore::new(path);
        assert_eq!(store.load().await.unwrap().len(), 20);
    }
}
