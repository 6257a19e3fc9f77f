// [libs/infra/session-pool/src/pool.rs]
//! Bounded container of `pool_size` session holders (spec §4.3). Backed by
//! a `Mutex<VecDeque<_>>` rather than an `mpsc` channel — there is no
//! producer/consumer relationship here, just mutual exclusion over a
//! fixed set of reusable holders, so a semaphore-guarded deque is the
//! more direct idiom.

use crate::holder::SessionHolder;
use std::collections::VecDeque;
use tokio::sync::{Mutex, Semaphore};

pub struct SessionPool {
    holders: Mutex<VecDeque<SessionHolder>>,
    availability: Semaphore,
    session_max_requests: u32,
}

impl SessionPool {
    pub fn new(pool_size: usize, session_max_requests: u32) -> Self {
        let mut holders = VecDeque::with_capacity(pool_size);
        holders.extend((0..pool_size).map(|_| SessionHolder::empty()));
        Self {
            holders: Mutex::new(holders),
            availability: Semaphore::new(pool_size),
            session_max_requests,
        }
    }

    /// Blocks until a holder is available, then returns it.
    pub async fn acquire(&self) -> SessionHolder {
        let permit = self
            .availability
            .acquire()
            .await
            .expect("availability semaphore is never closed");
        permit.forget();
        self.holders
            .lock()
            .await
            .pop_front()
            .expect("a permit guarantees a holder is enqueued")
    }

    /// Returns `holder` to the pool. Tears it down first if it has served
    /// `session_max_requests` or more tasks.
    pub async fn release(&self, mut holder: SessionHolder) {
        if holder.used_tasks >= self.session_max_requests {
            holder.recycle();
        }
        self.holders.lock().await.push_back(holder);
        self.availability.add_permits(1);
    }

    /// Tears down every currently-enqueued holder. Holders checked out at
    /// the moment of the call are torn down when they're next released.
    pub async fn close(&self) {
        let mut holders = self.holders.lock().await;
        for holder in holders.iter_mut() {
            holder.recycle();
        }
    }
}
