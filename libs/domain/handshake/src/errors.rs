// [libs/domain/handshake/src/errors.rs]
use thiserror::Error;

/// One stage of the handshake failed; carries the stage's name so the
/// caller can log it exactly like `run_registration_flow`'s `when`
/// variable. Transient transport errors (timeouts, resets) collapse into
/// the same variant per spec §7 ("Transient... treated as StageFailed").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("StageFailed({0})")]
pub struct StageFailed(pub &'static str);

pub const STAGE_REGISTER: &str = "make_did_iid";
pub const STAGE_ALERT_CHECK: &str = "alert_check";
pub const STAGE_SIGN: &str = "make_ds_sign";
