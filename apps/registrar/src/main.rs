// [apps/registrar/src/main.rs]
//! Entry point: wires configuration, the DB client, the session pool, the
//! worker pool and the fill-loop controller together, then hands control
//! to the fill-loop until it converges or a shutdown signal arrives.
//! Grounded on `apps/miner-worker/src/main.rs`'s "pure switchboard" shape
//! (parse directives, build collaborators, delegate the run loop) and its
//! `Arc<AtomicBool>`-via-`tokio::signal::ctrl_c()` signal pattern — that
//! repo also declares a `ctrlc` crate dependency, but grepping its tree
//! turns up no call site for it, so this binary follows the idiom it
//! actually uses rather than the one it merely lists.
//!
//! `main` stays synchronous long enough to load `Config` and size the
//! runtime's blocking-thread pool from `resolved_thread_pool_size()` before
//! handing off to `block_on`; a bare `#[tokio::main]` would build the
//! runtime before the config exists and this value would go unused.

use anyhow::{Context, Result};
use devpool_config::Config;
use devpool_db::DevicePoolClient;
use devpool_fill_loop::FillLoopConfig;
use devpool_pipeline::BackupConfig;
use devpool_session_pool::{SessionPool, DEFAULT_USER_AGENT};
use devpool_worker_pool::{cancel_signal, WorkerPool};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    let thread_pool_size = config.resolved_thread_pool_size();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(thread_pool_size as usize)
        .build()
        .context("RUNTIME_FAULT: failed to build the tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    info!("registrar starting up");

    let proxies = devpool_config::load_proxy_list(&config.proxy_list_path)
        .context("CONFIG_FAULT: no usable proxy list, refusing to start")?;
    info!("loaded {} proxies from {}", proxies.len(), config.proxy_list_path);

    let db = Arc::new(
        DevicePoolClient::connect(&config.db_host, config.db_password.clone())
            .await
            .context("DB_FAULT: failed to connect to the device pool store")?,
    );

    let session_pool = Arc::new(SessionPool::new(
        config.mwzzzh_session_pool_size,
        config.mwzzzh_session_max_requests,
    ));

    let worker_pool = Arc::new(WorkerPool::new(
        session_pool,
        proxies,
        config.gen_concurrency as usize,
        resolve_user_agent(config.mwzzzh_impersonate.as_deref()),
        config.session_keepalive(),
    ));

    let backup = config.save_to_file.then(|| BackupConfig {
        directory: PathBuf::from(&config.device_backup_dir),
        prefix: config.device_file_prefix.clone(),
        file_shards: config.device_file_shards,
        fsync: config.mwzzzh_file_fsync,
    });

    let (cancel_handle, cancel) = cancel_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutdown requested, draining in-flight work (interrupt again to force exit)");
            cancel_handle.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("second interrupt received, exiting immediately without draining");
            std::process::exit(130);
        }
    });

    let fill_loop_config = FillLoopConfig {
        shard_count: config.db_device_pool_shards as u32,
        target_per_shard: config.fill_target_per_shard(),
        batch_max: config.fill_batch_max(),
        interval: Duration::from_secs(config.mwzzzh_poll_interval_sec),
        hard_cap: config.mwzzzh_poll_max_total,
        run_once: config.mwzzzh_poll_once || !config.mwzzzh_poll_mode,
    };

    let filled_total = devpool_fill_loop::run(fill_loop_config, db, backup, cancel, move |n, task_id_start, pipeline, cancel| {
        let worker_pool = worker_pool.clone();
        async move { worker_pool.run_batch(n, task_id_start, pipeline, cancel).await }
    })
    .await;

    info!(filled_total, "fill-loop finished, shutting down");
    Ok(())
}

/// Resolves an impersonation profile name to a concrete user-agent string.
/// The workspace carries no TLS-fingerprint-spoofing crate, so this only
/// governs the `User-Agent` header (spec §9).
fn resolve_user_agent(profile: Option<&str>) -> String {
    match profile {
        None | Some("default") => DEFAULT_USER_AGENT.to_string(),
        Some(other) => {
            warn!("unrecognized MWZZZH_IMPERSONATE profile {other:?}, falling back to default");
            DEFAULT_USER_AGENT.to_string()
        }
    }
}
