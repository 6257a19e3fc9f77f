// [libs/infra/pipeline/src/backup.rs]
//! Sidecar file backup: one append-only handle per `shard_key mod
//! file_shards` bucket, line-per-record, flushed every batch, optionally
//! fsync'd. No direct teacher analogue; written in the teacher's explicit
//! `open`/`flush`/`close` resource-lifecycle idiom rather than a
//! Drop-based writer that can silently swallow a failed flush.
//!
//! Sidecar failures are never fatal (spec §9's explicit resolution): every
//! method here returns `std::io::Result`, and callers log-and-continue on
//! error instead of propagating it into the DB write path.

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

pub struct FileBackupWriter {
    directory: PathBuf,
    prefix: String,
    file_shards: u32,
    fsync: bool,
    handles: HashMap<u32, File>,
}

impl FileBackupWriter {
    pub async fn open(
        directory: PathBuf,
        prefix: String,
        file_shards: u32,
        fsync: bool,
    ) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&directory).await?;
        Ok(Self { directory, prefix, file_shards, fsync, handles: HashMap::new() })
    }

    fn bucket_of(&self, shard_key: u64) -> u32 {
        (shard_key % self.file_shards.max(1) as u64) as u32
    }

    async fn handle_for(&mut self, bucket: u32) -> std::io::Result<&mut File> {
        if !self.handles.contains_key(&bucket) {
            let path = self.directory.join(format!("{}_{}.txt", self.prefix, bucket));
            let file = OpenOptions::new().create(true).append(true).open(path).await?;
            self.handles.insert(bucket, file);
        }
        Ok(self.handles.get_mut(&bucket).expect("just inserted"))
    }

    /// Appends every `(shard_key, line)` pair to its bucket file, then
    /// flushes (and optionally fsyncs) each touched handle once.
    pub async fn write_batch(&mut self, items: &[(u64, String)]) -> std::io::Result<()> {
        let mut touched = Vec::new();
        for (shard_key, line) in items {
            let bucket = self.bucket_of(*shard_key);
            let handle = self.handle_for(bucket).await?;
            handle.write_all(line.as_bytes()).await?;
            handle.write_all(b"\n").await?;
            if !touched.contains(&bucket) {
                touched.push(bucket);
            }
        }
        for bucket in touched {
            let handle = self.handles.get_mut(&bucket).expect("touched implies present");
            handle.flush().await?;
            if self.fsync {
                handle.sync_all().await?;
            }
        }
        Ok(())
    }

    pub async fn close(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_to_the_bucket_matching_shard_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            FileBackupWriter::open(dir.path().to_path_buf(), "devices".into(), 2, false).await.unwrap();
        writer.write_batch(&[(0, "line-a".into()), (1, "line-b".into()), (2, "line-c".into())]).await.unwrap();
        writer.close().await;

        let bucket0 = tokio::fs::read_to_string(dir.path().join("devices_0.txt")).await.unwrap();
        let bucket1 = tokio::fs::read_to_string(dir.path().join("devices_1.txt")).await.unwrap();
        assert_eq!(bucket0, "line-a\nline-c\n");
        assert_eq!(bucket1, "line-b\n");
    }

    #[tokio::test]
    async fn reopening_a_bucket_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut writer =
                FileBackupWriter::open(dir.path().to_path_buf(), "devices".into(), 1, false).await.unwrap();
            writer.write_batch(&[(0, "first".into())]).await.unwrap();
            writer.close().await;
        }
        let mut writer =
            FileBackupWriter::open(dir.path().to_path_buf(), "devices".into(), 1, false).await.unwrap();
        writer.write_batch(&[(0, "second".into())]).await.unwrap();
        writer.close().await;

        let contents = tokio::fs::read_to_string(dir.path().join("devices_0.txt")).await.unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
