// [libs/infra/pipeline/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[L4_PIPELINE_FAULT]: QUEUE_CLOSED -> writer task is no longer accepting items")]
    QueueClosed,
}
