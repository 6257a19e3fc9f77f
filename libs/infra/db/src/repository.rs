// [libs/infra/db/src/repository.rs]
//! Device pool reads and writes. The upsert path is grounded on the
//! teacher's `repositories/worker.rs::upsert_bulk`: one transaction per
//! batch, one `execute` per row, `ON CONFLICT DO UPDATE SET ... =
//! excluded....`, committed once at the end.

use crate::errors::DbError;
use chrono::Utc;
use devpool_models::DeviceRecord;
use libsql::Connection;
use tracing::{debug, instrument};

/// One row ready to be upserted: a fabricated device plus the shard it was
/// assigned to.
pub struct DeviceRow {
    pub shard_id: u32,
    pub device_id: String,
    pub device: DeviceRecord,
}

const UPSERT_CHUNK_SIZE: usize = 200;

/// Total rows currently resident in `shard_id`.
#[instrument(skip(conn))]
pub async fn count(conn: &Connection, shard_id: u32) -> Result<u64, DbError> {
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM device_pool_devices WHERE shard_id = ?1",
            libsql::params![shard_id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DbError::MappingError("COUNT(*) returned no row".into()))?;
    let total: i64 = row.get(0)?;
    Ok(total as u64)
}

/// Inserts or refreshes `rows`, `UPSERT_CHUNK_SIZE` at a time, each chunk in
/// its own transaction. At-least-once: callers retry the whole batch on
/// failure, and the upsert is idempotent on `device_id`.
#[instrument(skip(conn, rows), fields(count = rows.len()))]
pub async fn upsert(conn: &Connection, rows: &[DeviceRow]) -> Result<(), DbError> {
    for chunk in rows.chunks(UPSERT_CHUNK_SIZE) {
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        for row in chunk {
            let device_json = serde_json::to_string(&row.device)
                .map_err(|e| DbError::MappingError(e.to_string()))?;
            let now = Utc::now().to_rfc3339();

            tx.execute(
                "INSERT INTO device_pool_devices (device_id, shard_id, device_json, use_count, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4)
                 ON CONFLICT(device_id) DO UPDATE SET
                     shard_id = excluded.shard_id,
                     device_json = excluded.device_json,
                     updated_at = excluded.updated_at",
                libsql::params![row.device_id.as_str(), row.shard_id, device_json.as_str(), now.as_str()],
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;
        debug!("upserted chunk of {} device rows", chunk.len());
    }
    Ok(())
}

/// Removes the `n` most-used rows from `shard_id`, freeing them for
/// regeneration. SQLite has no `DELETE ... ORDER BY ... LIMIT`, so eviction
/// goes through a `rowid IN (subquery)` indirection.
#[instrument(skip(conn))]
pub async fn evict(conn: &Connection, shard_id: u32, n: u32) -> Result<u64, DbError> {
    if n == 0 {
        return Ok(0);
    }
    let deleted = conn
        .execute(
            "DELETE FROM device_pool_devices
             WHERE rowid IN (
                 SELECT rowid FROM device_pool_devices
                 WHERE shard_id = ?1
                 ORDER BY use_count DESC
                 LIMIT ?2
             )",
            libsql::params![shard_id, n],
        )
        .await?;
    Ok(deleted)
}

/// Takes the `n` least-used rows out of `shard_id` for a worker to claim,
/// bumping `use_count` so repeated draws fan out across the shard.
#[instrument(skip(conn))]
pub async fn checkout(conn: &Connection, shard_id: u32, n: u32) -> Result<Vec<DeviceRecord>, DbError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut rows = conn
        .query(
            "SELECT device_id, device_json FROM device_pool_devices
             WHERE shard_id = ?1
             ORDER BY use_count ASC
             LIMIT ?2",
            libsql::params![shard_id, n],
        )
        .await?;

    let mut out = Vec::new();
    let mut claimed_ids = Vec::new();
    while let Some(row) = rows.next().await? {
        let device_id: String = row.get(0)?;
        let device_json: String = row.get(1)?;
        let device: DeviceRecord =
            serde_json::from_str(&device_json).map_err(|e| DbError::MappingError(e.to_string()))?;
        claimed_ids.push(device_id);
        out.push(device);
    }

    for device_id in claimed_ids {
        conn.execute(
            "UPDATE device_pool_devices SET use_count = use_count + 1 WHERE device_id = ?1",
            libsql::params![device_id],
        )
        .await?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DevicePoolClient;
    use proptest::prelude::*;

    fn sample_device(id: &str) -> DeviceRecord {
        DeviceRecord {
            cdid: id.to_string(),
            openudid: String::new(),
            clientudid: String::new(),
            device_uid: id.to_string(),
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
            device_id: None,
            install_id: None,
        }
    }

    async fn memory_conn() -> Connection {
        let client = DevicePoolClient::connect(":memory:", None).await.unwrap();
        client.get_connection().unwrap()
    }

    #[tokio::test]
    async fn upsert_then_count_round_trips() {
        let conn = memory_conn().await;
        let rows = vec![
            DeviceRow { shard_id: 0, device_id: "d1".into(), device: sample_device("d1") },
            DeviceRow { shard_id: 0, device_id: "d2".into(), device: sample_device("d2") },
        ];
        upsert(&conn, &rows).await.unwrap();
        assert_eq!(count(&conn, 0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_device_id() {
        let conn = memory_conn().await;
        let rows = vec![DeviceRow { shard_id: 0, device_id: "d1".into(), device: sample_device("d1") }];
        upsert(&conn, &rows).await.unwrap();
        upsert(&conn, &rows).await.unwrap();
        assert_eq!(count(&conn, 0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn evict_removes_highest_use_count_rows() {
        let conn = memory_conn().await;
        let rows = vec![
            DeviceRow { shard_id: 0, device_id: "d1".into(), device: sample_device("d1") },
            DeviceRow { shard_id: 0, device_id: "d2".into(), device: sample_device("d2") },
        ];
        upsert(&conn, &rows).await.unwrap();
        checkout(&conn, 0, 1).await.unwrap();
        let evicted = evict(&conn, 0, 1).await.unwrap();
        assert_eq!(evicted, 1);
        assert_eq!(count(&conn, 0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn checkout_prefers_least_used_rows() {
        let conn = memory_conn().await;
        let rows = vec![
            DeviceRow { shard_id: 0, device_id: "d1".into(), device: sample_device("d1") },
            DeviceRow { shard_id: 0, device_id: "d2".into(), device: sample_device("d2") },
        ];
        upsert(&conn, &rows).await.unwrap();
        checkout(&conn, 0, 1).await.unwrap();
        let second = checkout(&conn, 0, 1).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].device_uid, "d2");
    }

    proptest::proptest! {
        /// Upsert idempotence (spec §8): upserting the same device id any
        /// number of times never grows the row count past one, regardless
        /// of how many repeats or which shard it lands in.
        #[test]
        fn upsert_is_idempotent_for_any_repeat_count(
            repeats in 1usize..=6,
            shard_id in 0u32..8,
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let conn = memory_conn().await;
                let rows = vec![DeviceRow { shard_id, device_id: "stable-id".into(), device: sample_device("stable-id") }];
                for _ in 0..repeats {
                    upsert(&conn, &rows).await.unwrap();
                }
                assert_eq!(count(&conn, shard_id).await.unwrap(), 1);
            });
        }
    }
}
