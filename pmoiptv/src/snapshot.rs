//! Snapshot artifact on disk
//!
//! One pretty-printed JSON document at a fixed location, fully replaced by
//! every successful run. The new document goes to a sibling temporary file
//! first and is renamed over the old one, so a failed write never leaves a
//! truncated artifact behind.

use crate::error::Result;
use crate::models::{CuratedRecord, Snapshot};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// File name of the artifact inside the snapshot directory
pub const SNAPSHOT_FILE_NAME: &str = "streams.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    /// Writer targeting an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writer targeting `<directory>/streams.json`
    pub fn in_directory(directory: impl AsRef<Path>) -> Self {
        Self::new(directory.as_ref().join(SNAPSHOT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the artifact as published to clients
    ///
    /// Only the snapshot directory name and the file name are kept, e.g.
    /// `/data/streams.json`. The server filesystem layout is never exposed.
    pub fn public_path(&self) -> String {
        let file = self
            .path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| SNAPSHOT_FILE_NAME.to_string());

        match self
            .path
            .parent()
            .and_then(Path::file_name)
            .map(|d| d.to_string_lossy())
        {
            Some(dir) => format!("/{}/{}", dir, file),
            None => format!("/{}", file),
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Stamp, count and write the curated list
    pub async fn write_records(&self, streams: Vec<CuratedRecord>) -> Result<(Snapshot, PathBuf)> {
        let snapshot = Snapshot::new(streams);
        let path = self.write(&snapshot).await?;
        Ok((snapshot, path))
    }

    /// Write a snapshot, replacing any previous one
    pub async fn write(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, json).await {
            discard(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            discard(&temp_path).await;
            return Err(e.into());
        }

        info!(
            path = %self.path.display(),
            total = snapshot.total_streams,
            enabled = snapshot.enabled_streams,
            "Snapshot written"
        );

        Ok(self.path.clone())
    }

    /// Load the current snapshot, `None` when no run has written one yet
    pub async fn read(&self) -> Result<Option<Snapshot>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }
}

async fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %temp_path.display(), "Failed to remove temporary snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, enabled: bool) -> CuratedRecord {
        CuratedRecord {
            name: name.to_string(),
            url: format!("https://{}/live.m3u8", name.to_lowercase()),
            enabled,
        }
    }

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::in_directory(dir.path().join("public").join("data"));

        let path = writer
            .write(&Snapshot::new(vec![record("A", true)]))
            .await
            .unwrap();

        assert!(path.exists());
        assert!(path.ends_with("public/data/streams.json"));
        assert!(!writer.temp_path().exists());
    }

    #[tokio::test]
    async fn test_write_is_pretty_json() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::in_directory(dir.path());

        let (_, path) = writer
            .write_records(vec![record("A", true), record("B", false)])
            .await
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();

        assert!(text.contains('\n'));
        assert!(text.contains("\"lastUpdated\""));
        assert!(text.contains("\"totalStreams\": 2"));
        assert!(text.contains("\"enabledStreams\": 1"));
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::in_directory(dir.path());

        writer
            .write_records(vec![record("A", true), record("B", true), record("C", false)])
            .await
            .unwrap();
        writer.write_records(vec![record("D", false)]).await.unwrap();

        let snapshot = writer.read().await.unwrap().unwrap();
        assert_eq!(snapshot.total_streams, 1);
        assert_eq!(snapshot.enabled_streams, 0);
        assert_eq!(snapshot.streams, vec![record("D", false)]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::in_directory(dir.path());

        writer
            .write_records(vec![record("A", true), record("B", false)])
            .await
            .unwrap();
        let before = std::fs::read_to_string(writer.path()).unwrap();

        // A directory squatting the temporary file makes the write fail
        std::fs::create_dir(writer.temp_path()).unwrap();
        assert!(writer.write_records(vec![record("C", true)]).await.is_err());

        assert_eq!(std::fs::read_to_string(writer.path()).unwrap(), before);
        let snapshot = writer.read().await.unwrap().unwrap();
        assert_eq!(snapshot.total_streams, 2);
    }

    #[test]
    fn test_public_path_hides_server_layout() {
        let writer = SnapshotWriter::in_directory("/srv/pmoiptv/data");
        assert_eq!(writer.public_path(), "/data/streams.json");

        let writer = SnapshotWriter::new("streams.json");
        assert_eq!(writer.public_path(), "/streams.json");
    }

    #[tokio::test]
    async fn test_read_without_snapshot() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::in_directory(dir.path());
        assert!(writer.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_corrupted_snapshot_fails() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::in_directory(dir.path());
        std::fs::write(writer.path(), "{ not json").unwrap();

        assert!(writer.read().await.is_err());
    }

    #[tokio::test]
    async fn test_write_into_a_file_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let writer = SnapshotWriter::in_directory(&blocker);
        assert!(writer.write_records(vec![record("A", true)]).await.is_err());
    }
}
