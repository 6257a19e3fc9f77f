// [libs/infra/pipeline/src/writer.rs]
//! Single-consumer bounded queue feeding one writer task (spec §4.5).
//! Grounded on `apps/orchestrator/src/services/outbox_relay.rs::spawn_archival_loop`'s
//! sleep-and-retry shape (here: retry the same batch on failure instead of
//! moving on, since persistence must be at-least-once) — here the queue is
//! deliberately *bounded*, unlike that loop's unbounded findings channel,
//! per spec §5's back-pressure requirement.

use crate::backoff::delay_for_attempt;
use crate::backup::FileBackupWriter;
use devpool_db::{self, DbError, DevicePoolClient};
use devpool_models::{shard_of, ProvisionedDevice};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, instrument, warn};

pub const DEFAULT_BATCH_SIZE: usize = 20;
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// One provisioned device awaiting persistence, tagged with the producing
/// task's `shard_key` (used for file-backup bucketing, spec §4.5/§4.7).
pub struct WriteBatchItem {
    pub shard_key: u64,
    pub device: ProvisionedDevice,
}

#[derive(Clone)]
pub struct BackupConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub file_shards: u32,
    pub fsync: bool,
}

/// Handle to the running writer task. `submit` back-pressures once the
/// bounded queue is full; `shutdown` stops accepting new items and blocks
/// until every already-enqueued item is durably persisted.
pub struct Pipeline {
    sender: mpsc::Sender<WriteBatchItem>,
    writer_task: JoinHandle<()>,
}

impl Pipeline {
    /// `forced_shard`: when set, every item is written to this DB shard
    /// regardless of its device_id's CRC assignment (fill-loop mode, spec
    /// §4.6). When `None`, `shard(device_id) = crc32fast(device_id) mod N`
    /// is used, matching ordinary registration traffic.
    pub fn spawn(
        db: Arc<DevicePoolClient>,
        shard_count: u32,
        forced_shard: Option<u32>,
        batch_size: usize,
        backup: Option<BackupConfig>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(DEFAULT_QUEUE_CAPACITY);
        let writer_task = tokio::spawn(run_writer(receiver, db, shard_count, forced_shard, batch_size, backup));
        Self { sender, writer_task }
    }

    /// Enqueues `item`. Blocks (back-pressures the caller) once the bounded
    /// queue is full rather than silently dropping work.
    pub async fn submit(&self, item: WriteBatchItem) -> Result<(), crate::errors::PipelineError> {
        self.sender.send(item).await.map_err(|_| crate::errors::PipelineError::QueueClosed)
    }

    /// Stops accepting new items and waits for the writer task to drain the
    /// queue to completion (spec §4.5/§7: shutdown honors retry, never
    /// returns early).
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(join_fault) = self.writer_task.await {
            error!("pipeline writer task panicked during shutdown: {join_fault}");
        }
    }
}

#[instrument(skip_all, fields(shard_count, forced_shard))]
async fn run_writer(
    mut receiver: mpsc::Receiver<WriteBatchItem>,
    db: Arc<DevicePoolClient>,
    shard_count: u32,
    forced_shard: Option<u32>,
    batch_size: usize,
    backup: Option<BackupConfig>,
) {
    let mut backup_writer = match backup {
        Some(cfg) => match FileBackupWriter::open(cfg.directory, cfg.prefix, cfg.file_shards, cfg.fsync).await {
            Ok(writer) => Some(writer),
            Err(open_fault) => {
                warn!("file backup disabled: failed to open backup directory: {open_fault}");
                None
            }
        },
        None => None,
    };

    loop {
        let first = match receiver.recv().await {
            Some(item) => item,
            None => break,
        };

        let mut batch = Vec::with_capacity(batch_size);
        batch.push(first);
        while batch.len() < batch_size {
            match receiver.try_recv() {
                Ok(item) => batch.push(item),
                Err(_) => break,
            }
        }

        flush_with_retry(&db, shard_count, forced_shard, &batch).await;

        if let Some(writer) = backup_writer.as_mut() {
            let lines: Vec<(u64, String)> = batch
                .iter()
                .filter_map(|item| serde_json::to_string(&item.device).ok().map(|line| (item.shard_key, line)))
                .collect();
            if let Err(backup_fault) = writer.write_batch(&lines).await {
                warn!("sidecar file backup write failed (non-fatal): {backup_fault}");
            }
        }
    }

    if let Some(mut writer) = backup_writer {
        writer.close().await;
    }
}

/// Retries the same batch forever with exponential backoff on DB failure
/// (spec §7: `PipelineFlushFailed` is never dropped). Only returns once the
/// batch is durably persisted.
async fn flush_with_retry(
    db: &DevicePoolClient,
    shard_count: u32,
    forced_shard: Option<u32>,
    batch: &[WriteBatchItem],
) {
    let rows: Vec<devpool_db::DeviceRow> = batch
        .iter()
        .map(|item| {
            let device_id = item.device.device_id.clone();
            let shard_id = forced_shard.unwrap_or_else(|| shard_of(&device_id, shard_count));
            devpool_db::DeviceRow { shard_id, device_id, device: item.device.device.clone() }
        })
        .collect();

    let mut attempt = 0u32;
    loop {
        let outcome: Result<(), DbError> = match db.get_connection() {
            Ok(conn) => devpool_db::upsert(&conn, &rows).await,
            Err(connection_fault) => Err(connection_fault),
        };

        match outcome {
            Ok(()) => return,
            Err(flush_fault) => {
                let delay = delay_for_attempt(attempt);
                error!(
                    "batch flush failed (attempt {attempt}), retrying in {}s: {flush_fault}",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}
