// [libs/infra/worker-pool/src/lib.rs]
mod cancel;
mod pool;
mod proxy;

pub use cancel::{cancel_signal, CancelHandle, CancelSignal};
pub use pool::WorkerPool;
pub use proxy::ProxyCycle;
