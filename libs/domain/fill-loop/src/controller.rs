// [libs/domain/fill-loop/src/controller.rs]
//! The controller loop itself (spec §4.8). Generalizes
//! `original_source/generate_devices_bulk.py::main`'s
//! target/needed/batch-size loop into a long-running async controller;
//! batch launching is injected as a closure rather than a hard dependency
//! on `devpool_worker_pool::WorkerPool` directly, the same seam-injection
//! principle behind `devpool_handshake::HandshakeTransport` — here a
//! generic closure suffices since there is exactly one production call
//! site and no need for dynamic dispatch.

use crate::config::FillLoopConfig;
use devpool_db::DevicePoolClient;
use devpool_pipeline::{BackupConfig, Pipeline};
use devpool_worker_pool::CancelSignal;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Runs the fill-loop to completion (run-once) or until cancelled.
/// `launch_batch(n, task_id_start, pipeline, cancel)` must spawn `n`
/// registration tasks against `pipeline` and resolve once they've all
/// finished, returning the number that actually succeeded. Returns the
/// total number of registration attempts scheduled across every
/// iteration.
pub async fn run<F, Fut>(
    config: FillLoopConfig,
    db: Arc<DevicePoolClient>,
    backup: Option<BackupConfig>,
    cancel: CancelSignal,
    mut launch_batch: F,
) -> u64
where
    F: FnMut(u64, u64, Arc<Pipeline>, CancelSignal) -> Fut,
    Fut: Future<Output = usize>,
{
    let mut filled_total: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let (idx, cur_min) = match smallest_shard(&db, config.shard_count).await {
            Ok(pair) => pair,
            Err(db_fault) => {
                tracing::error!("fill-loop failed to read shard counts: {db_fault}");
                break;
            }
        };

        if cur_min >= config.target_per_shard {
            if config.run_once {
                break;
            }
            sleep_or_cancel(config.interval, &cancel).await;
            continue;
        }

        let missing = config.target_per_shard - cur_min;
        let mut fill = missing.min(config.batch_max as u64);
        if let Some(cap) = config.hard_cap {
            let remaining = cap.saturating_sub(filled_total);
            fill = fill.min(remaining);
            if fill == 0 {
                info!("fill-loop hard cap exhausted, stopping");
                break;
            }
        }

        let pipeline = Arc::new(Pipeline::spawn(
            db.clone(),
            config.shard_count,
            Some(idx),
            devpool_pipeline::DEFAULT_BATCH_SIZE,
            backup.clone(),
        ));

        let task_id_start = filled_total;
        let submitted = launch_batch(fill, task_id_start, pipeline.clone(), cancel.clone()).await;

        match Arc::try_unwrap(pipeline) {
            Ok(pipeline) => pipeline.shutdown().await,
            Err(_) => tracing::error!("pipeline still shared after batch completion, cannot shut down cleanly"),
        }

        filled_total += fill;
        info!(
            shard_id = idx,
            cur = cur_min,
            target = config.target_per_shard,
            missing,
            filled_total,
            submitted,
            "fill-loop iteration complete"
        );

        // `run_once` drives iterations back-to-back with no inter-batch
        // sleep until the top-of-loop convergence check (or the cap check
        // above) ends the run; it means "converge once", not "one batch".
        if !config.run_once {
            sleep_or_cancel(config.interval, &cancel).await;
        }
    }

    filled_total
}

async fn smallest_shard(db: &DevicePoolClient, shard_count: u32) -> Result<(u32, u64), devpool_db::DbError> {
    let conn = db.get_connection()?;
    let mut smallest: Option<(u32, u64)> = None;
    for shard_id in 0..shard_count {
        let count = devpool_db::count(&conn, shard_id).await?;
        if smallest.map(|(_, min)| count < min).unwrap_or(true) {
            smallest = Some((shard_id, count));
        }
    }
    Ok(smallest.expect("shard_count is always >= 1"))
}

async fn sleep_or_cancel(interval: std::time::Duration, cancel: &CancelSignal) {
    tokio::select! {
        _ = tokio::time::sleep(interval) => {}
        _ = cancel.cancelled() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpool_models::{DeviceRecord, ProvisionedDevice};
    use devpool_pipeline::WriteBatchItem;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn stub_device(id: u64) -> ProvisionedDevice {
        let id = id.to_string();
        ProvisionedDevice {
            device: DeviceRecord {
                cdid: id.clone(),
                openudid: String::new(),
                clientudid: String::new(),
                device_uid: id.clone(),
                device_type: String::new(),
                device_brand: String::new(),
                device_manufacturer: String::new(),
                os_api: 30,
                os_version: "11".into(),
                resolution: String::new(),
                resolution_v2: String::new(),
                dpi: 0,
                rom: String::new(),
                rom_version: String::new(),
                ram_size: String::new(),
                screen_width_dp: 0,
                screen_height_dp: 0,
                google_aid: String::new(),
                package: String::new(),
                version_name: String::new(),
                version_code: String::new(),
                update_version_code: String::new(),
                sdk_version: String::new(),
                sdk_version_code: String::new(),
                sdk_target_version: String::new(),
                sdk_flavor: String::new(),
                release_build: String::new(),
                apk_first_install_time: 0,
                apk_last_update_time: 0,
                web_ua: String::new(),
                ua: String::new(),
                region: "US".into(),
                language: "en".into(),
                timezone_name: String::new(),
                timezone_offset: 0,
                device_id: Some(id.clone()),
                install_id: Some(id.clone()),
            },
            device_id: id.clone(),
            install_id: id.clone(),
            device_guard_data0: serde_json::json!({}),
            tt_ticket_guard_public_key: String::new(),
            priv_key: String::new(),
        }
    }

    /// A stand-in for the worker pool: every task "succeeds", submitting a
    /// distinct device per task id directly to the pipeline.
    async fn always_succeeds_launcher(
        n: u64,
        task_id_start: u64,
        pipeline: Arc<Pipeline>,
        _cancel: CancelSignal,
    ) -> usize {
        for offset in 0..n {
            let task_id = task_id_start + offset;
            pipeline
                .submit(WriteBatchItem { shard_key: task_id, device: stub_device(task_id) })
                .await
                .unwrap();
        }
        n as usize
    }

    /// S4: N=1, T=3, B=2, empty pool, all registrations succeed. Two
    /// iterations do work (2 then 1); the pool converges to count(0)=3.
    #[tokio::test]
    async fn single_shard_fill_converges_in_two_iterations() {
        let db = Arc::new(DevicePoolClient::connect(":memory:", None).await.unwrap());
        let config = FillLoopConfig {
            shard_count: 1,
            target_per_shard: 3,
            batch_max: 2,
            interval: Duration::from_millis(1),
            hard_cap: None,
            run_once: true,
        };
        let (_handle, cancel) = devpool_worker_pool::cancel_signal();

        let iterations = AtomicU64::new(0);
        let filled_total = run(config, db.clone(), None, cancel, |n, start, pipeline, cancel| {
            iterations.fetch_add(1, Ordering::SeqCst);
            always_succeeds_launcher(n, start, pipeline, cancel)
        })
        .await;

        assert_eq!(filled_total, 3);
        assert_eq!(iterations.load(Ordering::SeqCst), 2);

        let conn = db.get_connection().unwrap();
        assert_eq!(devpool_db::count(&conn, 0).await.unwrap(), 3);
    }

    /// S5: N=2, T=2, B=1, empty pool, all succeed. Four iterations, shard
    /// selection alternates because ties break to the lower index.
    #[tokio::test]
    async fn two_shard_fill_alternates_and_converges_in_four_iterations() {
        let db = Arc::new(DevicePoolClient::connect(":memory:", None).await.unwrap());
        let config = FillLoopConfig {
            shard_count: 2,
            target_per_shard: 2,
            batch_max: 1,
            interval: Duration::from_millis(1),
            hard_cap: None,
            run_once: true,
        };
        let (_handle, cancel) = devpool_worker_pool::cancel_signal();

        let iterations = AtomicU64::new(0);
        let filled_total = run(config, db.clone(), None, cancel, |n, start, pipeline, cancel| {
            iterations.fetch_add(1, Ordering::SeqCst);
            always_succeeds_launcher(n, start, pipeline, cancel)
        })
        .await;

        assert_eq!(filled_total, 4);
        assert_eq!(iterations.load(Ordering::SeqCst), 4);

        let conn = db.get_connection().unwrap();
        assert_eq!(devpool_db::count(&conn, 0).await.unwrap(), 2);
        assert_eq!(devpool_db::count(&conn, 1).await.unwrap(), 2);
    }

    /// A hard cap stops scheduling before the per-shard target is reached.
    #[tokio::test]
    async fn hard_cap_stops_scheduling_early() {
        let db = Arc::new(DevicePoolClient::connect(":memory:", None).await.unwrap());
        let config = FillLoopConfig {
            shard_count: 1,
            target_per_shard: 100,
            batch_max: 10,
            interval: Duration::from_millis(1),
            hard_cap: Some(15),
            run_once: true,
        };
        let (_handle, cancel) = devpool_worker_pool::cancel_signal();

        let filled_total = run(config, db.clone(), None, cancel, always_succeeds_launcher).await;

        assert_eq!(filled_total, 15);
        let conn = db.get_connection().unwrap();
        assert_eq!(devpool_db::count(&conn, 0).await.unwrap(), 15);
    }

    /// A pool already at target does no work and, in run-once mode, exits
    /// on the first check.
    #[tokio::test]
    async fn already_full_pool_does_no_work() {
        let db = Arc::new(DevicePoolClient::connect(":memory:", None).await.unwrap());
        {
            let pipeline = Pipeline::spawn(db.clone(), 1, Some(0), devpool_pipeline::DEFAULT_BATCH_SIZE, None);
            pipeline
                .submit(WriteBatchItem { shard_key: 0, device: stub_device(0) })
                .await
                .unwrap();
            pipeline.shutdown().await;
        }

        let config = FillLoopConfig {
            shard_count: 1,
            target_per_shard: 1,
            batch_max: 10,
            interval: Duration::from_millis(1),
            hard_cap: None,
            run_once: true,
        };
        let (_handle, cancel) = devpool_worker_pool::cancel_signal();

        let filled_total = run(config, db, None, cancel, always_succeeds_launcher).await;
        assert_eq!(filled_total, 0);
    }
}
