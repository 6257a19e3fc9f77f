// [libs/infra/pipeline/src/lib.rs]
mod backoff;
mod backup;
mod errors;
mod writer;

pub use backup::FileBackupWriter;
pub use errors::PipelineError;
pub use writer::{BackupConfig, Pipeline, WriteBatchItem, DEFAULT_BATCH_SIZE};
