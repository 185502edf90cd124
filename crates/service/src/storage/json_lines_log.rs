use std::path::PathBuf;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::warn;

use crate::errors::ServiceError;

/// Append-only JSON lines file: one record per line.
///
/// An append writes a single line and syncs it, so the cost does not grow
/// with the size of the log. Records are kept in memory for reads. The write
/// lock is held until the line is on disk.
pub struct JsonLinesLog<T> {
    inner: RwLock<LogState<T>>,
    file_path: PathBuf,
}

struct LogState<T> {
    records: Vec<T>,
    /// Length of the file up to the last complete line.
    bytes: u64,
}

impl<T> JsonLinesLog<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Load the log, creating an empty file if missing. A torn final line
    /// left by an interrupted append is cut off; any other bad line is an error.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let raw = match fs::read(&file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&file_path, b"").await.map_err(io_err)?;
                Vec::new()
            }
            Err(e) => return Err(io_err(e)),
        };

        let complete = raw.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        let mut records = Vec::new();
        for (n, line) in raw[..complete].split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record = serde_json::from_slice(line).map_err(|e| {
                ServiceError::Db(format!("{} line {}: {e}", file_path.display(), n + 1))
            })?;
            records.push(record);
        }
        if complete < raw.len() {
            warn!(path = %file_path.display(), dropped_bytes = raw.len() - complete, "discarding torn last line");
            truncate(&file_path, complete as u64).await?;
        }

        Ok(Arc::new(Self {
            inner: RwLock::new(LogState { records, bytes: complete as u64 }),
            file_path,
        }))
    }

    pub async fn records(&self) -> Vec<T> {
        self.inner.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Append `record` once `check` accepts it against the existing records.
    /// A failed write is cut back off the file and the record is not kept.
    pub async fn append<F>(&self, record: T, check: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&[T]) -> Result<(), ServiceError>,
    {
        let mut state = self.inner.write().await;
        check(&state.records)?;

        let mut line = serde_json::to_vec(&record).map_err(|e| ServiceError::Db(e.to_string()))?;
        line.push(b'\n');

        if let Err(e) = self.write_line(&line).await {
            if let Err(cut) = truncate(&self.file_path, state.bytes).await {
                warn!(path = %self.file_path.display(), error = %cut, "could not cut back failed append");
            }
            return Err(e);
        }
        state.bytes += line.len() as u64;
        state.records.push(record.clone());
        Ok(record)
    }

    async fn write_line(&self, line: &[u8]) -> Result<(), ServiceError> {
        let mut file = OpenOptions::new().append(true).open(&self.file_path).await.map_err(io_err)?;
        file.write_all(line).await.map_err(io_err)?;
        file.sync_data().await.map_err(io_err)?;
        Ok(())
    }
}

async fn truncate(path: &PathBuf, len: u64) -> Result<(), ServiceError> {
    let file = OpenOptions::new().write(true).open(path).await.map_err(io_err)?;
    file.set_len(len).await.map_err(io_err)
}

fn io_err(e: std::io::Error) -> ServiceError {
    ServiceError::Db(e.to_string())
}
