// [libs/infra/db/src/schema.rs]
//! Schema governance for the single `device_pool_devices` table. Grounded
//! on `original_source/generate_devices_bulk.py`'s table shape
//! (`shard_id`, `device_id`, `device_json`) and on the teacher's
//! `apply_full_sovereign_schema` idiom (idempotent `CREATE TABLE IF NOT
//! EXISTS` plus a best-effort evolutionary pass for older databases).

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

const TACTICAL_TABLES: &[(&str, &str)] = &[(
    "TABLE_DEVICE_POOL_DEVICES",
    r#"
        CREATE TABLE IF NOT EXISTS device_pool_devices (
            device_id TEXT PRIMARY KEY,
            shard_id INTEGER NOT NULL,
            device_json TEXT NOT NULL,
            use_count INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
    "#,
)];

const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[(
    "DEVICE_USE_COUNT",
    "ALTER TABLE device_pool_devices ADD COLUMN use_count INTEGER NOT NULL DEFAULT 0",
)];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[(
    "IDX_DEVICE_POOL_SHARD_USE",
    "CREATE INDEX IF NOT EXISTS idx_device_pool_shard_use ON device_pool_devices(shard_id, use_count);",
)];

#[instrument(skip(database_connection))]
pub async fn apply_full_schema(database_connection: &Connection) -> Result<()> {
    info!("applying device pool schema");

    solidify_base_strata(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("device pool schema level and certified");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("solidifying {identifier}");
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(sql, ()).await {
            Ok(_) => info!("applied evolutionary stratum {identifier}"),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!("{identifier} already level");
                } else {
                    warn!("{identifier} check incomplete: {message}");
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("hardening {identifier}");
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    Ok(())
}
