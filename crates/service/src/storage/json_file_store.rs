use std::{io::ErrorKind, marker::PhantomData, path::{Path, PathBuf}};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::debug;

use super::CollectionStore;
use crate::errors::ServiceError;

/// JSON file-backed collection store.
///
/// Persists a `Vec<T>` as one pretty-printed JSON array. Nothing is cached:
/// each `load` reads the file and each `save` replaces it by writing a sibling
/// temp file and renaming it over the target.
pub struct JsonFileStore<T> {
    file_path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), _record: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".tmp-{}", uuid::Uuid::new_v4()));
        self.file_path.with_file_name(name)
    }
}

#[async_trait]
impl<T> CollectionStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ServiceError::storage("read collection", e)),
        };
        // a file created but never written counts as empty
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::storage("parse collection", e))
    }

    async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage("create data directory", e))?;
        }
        let data = serde_json::to_vec_pretty(items).map_err(|e| ServiceError::storage("encode collection", e))?;
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage("write collection", e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage("replace collection", e));
        }
        debug!(path = %self.file_path.display(), records = items.len(), "collection saved");
        Ok(())
    }
}
