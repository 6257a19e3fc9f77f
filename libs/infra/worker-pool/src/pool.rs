// [libs/infra/worker-pool/src/pool.rs]
//! Bounded fan-out over the registration handshake (spec §4.7). Per task:
//! acquire a concurrency permit, pick the next proxy, check out a session,
//! run the handshake, submit the provisioned device to the pipeline, then
//! release the session and permit unconditionally. Cancellation is raced
//! against the in-flight handshake with `tokio::select!`, the same
//! abort-on-first-completion shape as
//! `apps/orchestrator/src/handlers/stream.rs`'s multi-branch `select!`,
//! generalized here from "first of N tasks wins" to "shutdown signal wins
//! over handshake".

use crate::cancel::CancelSignal;
use crate::proxy::ProxyCycle;
use devpool_pipeline::{Pipeline, WriteBatchItem};
use devpool_session_pool::SessionPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{instrument, warn};

pub struct WorkerPool {
    session_pool: Arc<SessionPool>,
    proxies: Arc<ProxyCycle>,
    semaphore: Arc<Semaphore>,
    user_agent: String,
    keepalive: Option<Duration>,
}

impl WorkerPool {
    pub fn new(
        session_pool: Arc<SessionPool>,
        proxies: Vec<String>,
        max_concurrency: usize,
        user_agent: String,
        keepalive: Option<Duration>,
    ) -> Self {
        Self {
            session_pool,
            proxies: Arc::new(ProxyCycle::new(proxies)),
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            user_agent,
            keepalive,
        }
    }

    /// Runs `n` registration tasks, tagged `task_id_start..task_id_start+n`,
    /// submitting each success to `pipeline` with `shard_key = task_id`.
    /// Stops launching new tasks once `cancel` fires, but still drains
    /// whatever is already in flight. Returns the count of devices
    /// successfully submitted to the pipeline.
    #[instrument(skip_all, fields(n, task_id_start))]
    pub async fn run_batch(
        &self,
        n: u64,
        task_id_start: u64,
        pipeline: Arc<Pipeline>,
        cancel: CancelSignal,
    ) -> usize {
        let mut tasks = JoinSet::new();
        for offset in 0..n {
            if cancel.is_cancelled() {
                break;
            }
            let task_id = task_id_start + offset;
            let session_pool = self.session_pool.clone();
            let semaphore = self.semaphore.clone();
            let proxy = self.proxies.next();
            let user_agent = self.user_agent.clone();
            let keepalive = self.keepalive;
            let pipeline = pipeline.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                run_one_task(task_id, session_pool, semaphore, proxy, user_agent, keepalive, pipeline, cancel).await
            });
        }

        let mut submitted = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => submitted += 1,
                Ok(false) => {}
                Err(join_fault) => warn!("registration task panicked: {join_fault}"),
            }
        }
        submitted
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_one_task(
    task_id: u64,
    session_pool: Arc<SessionPool>,
    semaphore: Arc<Semaphore>,
    proxy: Option<String>,
    user_agent: String,
    keepalive: Option<Duration>,
    pipeline: Arc<Pipeline>,
    cancel: CancelSignal,
) -> bool {
    let permit = semaphore.acquire_owned().await.expect("concurrency semaphore is never closed");

    let mut holder = session_pool.acquire().await;
    holder.used_tasks += 1;

    let device = devpool_core_gen::fabricate();
    let client = match holder.ensure(proxy.as_deref(), &user_agent, keepalive) {
        Ok(client) => client.clone(),
        Err(session_fault) => {
            warn!(task_id, "failed to prepare session for task: {session_fault}");
            session_pool.release(holder).await;
            drop(permit);
            return false;
        }
    };

    let handshake = devpool_handshake::run(&client, &device, || chrono::Utc::now().timestamp_millis());
    let outcome = tokio::select! {
        result = handshake => Some(result),
        _ = cancel.cancelled() => None,
    };

    let mut submitted = false;
    match outcome {
        Some(Ok(provisioned)) => {
            match pipeline.submit(WriteBatchItem { shard_key: task_id, device: provisioned }).await {
                Ok(()) => submitted = true,
                Err(submit_fault) => warn!(task_id, "pipeline rejected provisioned device: {submit_fault}"),
            }
        }
        Some(Err(stage_failed)) => warn!(task_id, "registration handshake failed: {stage_failed}"),
        None => {}
    }

    session_pool.release(holder).await;
    drop(permit);
    submitted
}
