//! One JSON array per file, read and rewritten whole on every access.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

/// A collection file guarded by an async lock, so each read or
/// read-modify-write is atomic with respect to other callers in-process.
pub struct JsonCollection<E> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> JsonCollection<E>
where
    E: Serialize + DeserializeOwned,
{
    /// Open `<dir>/<name>.json`, creating the directory and an empty `[]` file
    /// when missing.
    pub async fn open(dir: &Path, name: &str) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;
        let path = dir.join(format!("{name}.json"));
        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if !exists {
            tokio::fs::write(&path, b"[]")
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
            tracing::debug!(path = %path.display(), "created empty collection");
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
            _entity: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<E>> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Read, apply `f`, write back. The file is replaced even if `f` changed nothing.
    pub async fn modify<R>(&self, f: impl FnOnce(&mut Vec<E>) -> R) -> Result<R> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_unlocked().await?;
        let out = f(&mut items);
        self.write_unlocked(&items).await?;
        Ok(out)
    }

    async fn read_unlocked(&self) -> Result<Vec<E>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&raw)
            .with_context(|| format!("corrupt collection file {}", self.path.display()))
    }

    /// Write to a sibling temp file, then rename over the original.
    async fn write_unlocked(&self, items: &[E]) -> Result<()> {
        let json = serde_json::to_vec_pretty(items).context("failed to serialize collection")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
    }

    #[tokio::test]
    async fn open_creates_empty_array_file() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        let rows: JsonCollection<Row> = JsonCollection::open(&data, "rows").await.unwrap();
        assert_eq!(std::fs::read_to_string(rows.path()).unwrap(), "[]");
        assert!(rows.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn modify_writes_pretty_json() {
        let dir = tempdir().unwrap();
        let rows: JsonCollection<Row> = JsonCollection::open(dir.path(), "rows").await.unwrap();
        let len = rows
            .modify(|items| {
                items.push(Row { id: "a".into() });
                items.len()
            })
            .await
            .unwrap();
        assert_eq!(len, 1);

        let raw = std::fs::read_to_string(rows.path()).unwrap();
        assert_eq!(raw, "[\n  {\n    \"id\": \"a\"\n  }\n]");
        assert!(!dir.path().join("rows.json.tmp").exists());
    }

    #[tokio::test]
    async fn empty_file_reads_as_no_rows() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("rows.json"), "  \n").unwrap();
        let rows: JsonCollection<Row> = JsonCollection::open(dir.path(), "rows").await.unwrap();
        assert!(rows.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_and_is_not_overwritten() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("rows.json"), "{not json").unwrap();
        let rows: JsonCollection<Row> = JsonCollection::open(dir.path(), "rows").await.unwrap();

        let err = rows.load().await.unwrap_err();
        assert!(format!("{err:#}").contains("corrupt collection file"));
        assert!(rows.modify(|items| items.clear()).await.is_err());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("rows.json")).unwrap(),
            "{not json"
        );
    }

    #[tokio::test]
    async fn concurrent_modifications_are_serialized() {
        let dir = tempdir().unwrap();
        let rows: std::sync::Arc<JsonCollection<Row>> =
            std::sync::Arc::new(JsonCollection::open(dir.path(), "rows").await.unwrap());

        let mut tasks = Vec::new();
        for i in 0..20 {
            let rows = rows.clone();
            tasks.push(tokio::spawn(async move {
                rows.modify(|items| items.push(Row { id: i.to_string() }))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(rows.load().await.unwrap().len(), 20);
    }
}
