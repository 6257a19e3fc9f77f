// [libs/infra/session-pool/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("[L3_SESSION_FAULT]: CLIENT_BUILD_FAILED -> {0}")]
    BuildFailed(#[from] reqwest::Error),
}
