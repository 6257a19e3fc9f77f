// [libs/domain/handshake/src/handshake.rs]
//! Central dispatcher generalizing `original_source/register_logic.py`'s
//! `run_registration_flow`, in the "one function, `#[instrument(skip_all,
//! fields(...))]`, returns an immutable report struct" idiom observed in
//! the teacher's mining-strategy executor.

use crate::errors::StageFailed;
use crate::stages;
use crate::transport::{HandshakeTransport, ReqwestTransport};
use devpool_models::{DeviceRecord, ProvisionedDevice};
use tracing::instrument;

/// Drives `device` through register -> alert-check -> sign over a
/// borrowed, already-cookie-jarred client. On any stage failure, returns
/// the failing stage's name and drops the attempt — stage failures are
/// local and never abort the caller's batch (spec §7).
#[instrument(skip(client, device), fields(device_uid = %device.device_uid))]
pub async fn run(
    client: &reqwest::Client,
    device: &DeviceRecord,
    now_millis: impl Fn() -> i64,
) -> Result<ProvisionedDevice, StageFailed> {
    let transport = ReqwestTransport::new(client);
    run_with_transport(&transport, device, now_millis).await
}

/// Same flow as [`run`], but driven through an arbitrary
/// `HandshakeTransport` — the seam tests use to swap in a fixture-returning
/// fake instead of a real network call.
pub async fn run_with_transport(
    transport: &dyn HandshakeTransport,
    device: &DeviceRecord,
    now_millis: impl Fn() -> i64,
) -> Result<ProvisionedDevice, StageFailed> {
    let (device_id, install_id) = stages::register(transport, device, now_millis()).await?;
    stages::alert_check(transport, device, &device_id, &install_id, now_millis()).await?;
    let signed = stages::sign(transport, device, &device_id, &install_id, now_millis()).await?;

    let mut registered_device = device.clone();
    registered_device.device_id = Some(device_id.clone());
    registered_device.install_id = Some(install_id.clone());

    Ok(ProvisionedDevice {
        device: registered_device,
        device_id,
        install_id,
        device_guard_data0: signed.device_guard_data0,
        tt_ticket_guard_public_key: signed.tt_ticket_guard_public_key,
        priv_key: signed.priv_key,
    })
}
