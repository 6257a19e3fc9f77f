// [libs/infra/worker-pool/src/cancel.rs]
//! Cooperative cancellation signal. A `watch` channel rather than
//! `Notify`/`AtomicBool` broadcast because a task racing it with
//! `tokio::select!` must still observe a cancel that happened before the
//! task started waiting — `watch` retains the last value, `Notify` does
//! not (grounded on `std::sync::atomic::AtomicBool` signal idiom used by
//! `apps/miner-worker/src/main.rs`, generalized to a broadcastable form
//! since many concurrent tasks must all observe one shutdown).

use tokio::sync::watch;

#[derive(Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

pub fn cancel_signal() -> (CancelHandle, CancelSignal) {
    let (sender, receiver) = watch::channel(false);
    (CancelHandle { sender }, CancelSignal { receiver })
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancellation is signalled. Racing this in a
    /// `tokio::select!` against an in-flight handshake aborts the
    /// handshake future (spec §5: "a task that observes cancellation
    /// during HTTP I/O aborts... and returns without enqueueing").
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_observed_even_if_signalled_before_waiting() {
        let (handle, signal) = cancel_signal();
        handle.cancel();
        assert!(signal.is_cancelled());
        signal.cancelled().await;
    }

    #[tokio::test]
    async fn uncancelled_signal_blocks_cancelled_future() {
        let (handle, signal) = cancel_signal();
        assert!(!signal.is_cancelled());
        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());
        handle.cancel();
        waiter.await.unwrap();
    }
}
