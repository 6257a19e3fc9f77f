// [libs/domain/handshake/src/stages.rs]
//! The three wire stages. Each is driven through a `HandshakeTransport` so
//! the signing/parsing logic can be exercised against a fixture-returning
//! fake in tests (spec §8) while `ReqwestTransport` carries the real
//! session's cookie jar across stages 1-3 in production.

use crate::errors::{StageFailed, STAGE_ALERT_CHECK, STAGE_REGISTER, STAGE_SIGN};
use crate::query::{alert_check_query_string, register_query_string, sign_query_string, StageTimes};
use crate::transport::{HandshakeTransport, HttpRequest, Method};
use crate::wire::{DeviceProperties, RegisterBody, SignBody};
use devpool_models::DeviceRecord;
use devpool_signing::{canonical_body_json, sign_request, Keypair};
use serde_json::Value;
use tracing::instrument;

const REGISTER_URL: &str = "https://log-boot.tiktokv.com/service/2/device_register/";
const ALERT_CHECK_URL: &str = "https://log-boot.tiktokv.com/service/2/app_alert_check/";
const SIGN_URL: &str = "https://aggr16-normal.tiktokv.us/service/2/dsign/";

fn nonzero_id(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => {
            if n.as_i64() == Some(0) {
                None
            } else {
                Some(n.to_string())
            }
        }
        Some(Value::String(s)) if !s.is_empty() && s != "0" => Some(s.clone()),
        _ => None,
    }
}

/// The signable surface of stage 1, computed off the async scheduler:
/// the query string, serialized body, and the signing headers derived from
/// hashing both (spec §5: CPU-bound work runs on a dedicated worker-thread
/// executor, not inline on the task polling the handshake).
fn prepare_register(device: DeviceRecord, times: StageTimes) -> Result<(String, String, devpool_signing::SignedHeaders), StageFailed> {
    let query_string = register_query_string(&device, &times);
    let body = RegisterBody::from_device(&device, &times.req_id, times.rticket_millis);
    let body_json = canonical_body_json(&body).map_err(|_| StageFailed(STAGE_REGISTER))?;
    let body_hex = hex::encode(body_json.as_bytes());
    let headers = sign_request("", times.ts_seconds, 0, &query_string, &body_hex);
    Ok((query_string, body_json, headers))
}

/// Stage 1: register. Returns the `(device_id, install_id)` pair the
/// remaining stages depend on.
#[instrument(skip(transport, device), fields(device_uid = %device.device_uid))]
pub async fn register(
    transport: &dyn HandshakeTransport,
    device: &DeviceRecord,
    now_millis: i64,
) -> Result<(String, String), StageFailed> {
    let times = StageTimes::capture(now_millis);
    let owned_device = device.clone();
    let (query_string, body_json, headers) = tokio::task::spawn_blocking(move || prepare_register(owned_device, times))
        .await
        .map_err(|_| StageFailed(STAGE_REGISTER))??;

    let request = HttpRequest {
        method: Method::Post,
        url: format!("{REGISTER_URL}?{query_string}"),
        headers: vec![
            ("x-ss-stub", headers.x_ss_stub),
            ("x-khronos", headers.x_khronos),
            ("x-argus", headers.x_argus),
            ("x-ladon", headers.x_ladon),
            ("x-gorgon", headers.x_gorgon),
            ("user-agent", device.ua.clone()),
            ("content-type", "application/json; charset=utf-8".into()),
        ],
        body: body_json,
    };

    let response = transport.execute(request).await.map_err(|_| StageFailed(STAGE_REGISTER))?;
    let parsed: Value = tokio::task::spawn_blocking(move || serde_json::from_str::<Value>(&response.body))
        .await
        .map_err(|_| StageFailed(STAGE_REGISTER))?
        .map_err(|_| StageFailed(STAGE_REGISTER))?;
    let device_id = nonzero_id(parsed.get("device_id")).ok_or(StageFailed(STAGE_REGISTER))?;
    let install_id = nonzero_id(parsed.get("install_id")).ok_or(StageFailed(STAGE_REGISTER))?;
    Ok((device_id, install_id))
}

/// Stage 2: activation check. The response body must equal
/// `{"message":"success"}` byte-for-byte.
#[instrument(skip(transport, device), fields(device_uid = %device.device_uid))]
pub async fn alert_check(
    transport: &dyn HandshakeTransport,
    device: &DeviceRecord,
    device_id: &str,
    install_id: &str,
    now_millis: i64,
) -> Result<(), StageFailed> {
    let times = StageTimes::capture(now_millis);
    let owned_device = device.clone();
    let owned_device_id = device_id.to_string();
    let owned_install_id = install_id.to_string();
    let (query_string, headers) = tokio::task::spawn_blocking(move || {
        let query_string = alert_check_query_string(&owned_device, &times, &owned_device_id, &owned_install_id);
        let headers = sign_request(&owned_device_id, times.ts_seconds, 1, &query_string, "");
        (query_string, headers)
    })
    .await
    .map_err(|_| StageFailed(STAGE_ALERT_CHECK))?;

    let request = HttpRequest {
        method: Method::Get,
        url: format!("{ALERT_CHECK_URL}?{query_string}"),
        headers: vec![
            ("x-ss-stub", headers.x_ss_stub),
            ("x-khronos", headers.x_khronos),
            ("x-argus", headers.x_argus),
            ("x-ladon", headers.x_ladon),
            ("x-gorgon", headers.x_gorgon),
            ("user-agent", device.ua.clone()),
        ],
        body: String::new(),
    };

    let response = transport.execute(request).await.map_err(|_| StageFailed(STAGE_ALERT_CHECK))?;
    if response.body == r#"{"message":"success"}"# {
        Ok(())
    } else {
        Err(StageFailed(STAGE_ALERT_CHECK))
    }
}

pub struct SignOutcome {
    pub device_guard_data0: Value,
    pub tt_ticket_guard_public_key: String,
    pub priv_key: String,
}

struct PreparedSign {
    query_string: String,
    body_json: String,
    headers: devpool_signing::SignedHeaders,
    tt_ticket_guard_public_key: String,
    priv_key: String,
}

/// Everything stage 3 needs to build a request, computed off the async
/// scheduler: the query string, the serialized body (which includes the
/// SHA-256 `device_properties` hashes), the signing headers, and a fresh
/// secp256k1 keypair (spec §5: keypair generation, body hashing, and
/// response parsing all belong on the worker-thread executor, not inline
/// on the task polling the handshake).
fn prepare_sign(device: DeviceRecord, times: StageTimes, device_id: String, install_id: String) -> Result<PreparedSign, StageFailed> {
    let query_string = sign_query_string(&device, &times, &device_id, &install_id);

    let body = SignBody {
        device_id: device_id.clone(),
        install_id: install_id.clone(),
        aid: 1233,
        app_version: device.version_name.clone(),
        model: device.device_type.clone(),
        os: "Android",
        openudid: device.openudid.clone(),
        google_aid: device.google_aid.clone(),
        properties_version: "android-1.0",
        device_properties: DeviceProperties::for_device(&device),
    };
    let body_json = canonical_body_json(&body).map_err(|_| StageFailed(STAGE_SIGN))?;
    let body_hex = hex::encode(body_json.as_bytes());
    let headers = sign_request(&device_id, times.ts_seconds, 2, &query_string, &body_hex);

    let keypair = Keypair::generate();
    let tt_ticket_guard_public_key = keypair.public_key_base64();
    let priv_key = keypair.private_key_hex();

    Ok(PreparedSign { query_string, body_json, headers, tt_ticket_guard_public_key, priv_key })
}

/// Stage 3: signature exchange. Mints an ephemeral keypair, ships
/// `device_properties` hashes plus the fixed opaque constants, and decodes
/// the base64 `tt-device-guard-server-data` response field.
#[instrument(skip(transport, device), fields(device_uid = %device.device_uid))]
pub async fn sign(
    transport: &dyn HandshakeTransport,
    device: &DeviceRecord,
    device_id: &str,
    install_id: &str,
    now_millis: i64,
) -> Result<SignOutcome, StageFailed> {
    let times = StageTimes::capture(now_millis);
    let owned_device = device.clone();
    let owned_device_id = device_id.to_string();
    let owned_install_id = install_id.to_string();
    let PreparedSign { query_string, body_json, headers, tt_ticket_guard_public_key, priv_key } =
        tokio::task::spawn_blocking(move || prepare_sign(owned_device, times, owned_device_id, owned_install_id))
            .await
            .map_err(|_| StageFailed(STAGE_SIGN))??;

    let request = HttpRequest {
        method: Method::Post,
        url: format!("{SIGN_URL}?{query_string}"),
        headers: vec![
            ("cookie", format!("install_id={install_id}")),
            ("tt-ticket-guard-public-key", tt_ticket_guard_public_key.clone()),
            ("x-ss-stub", headers.x_ss_stub),
            ("x-khronos", headers.x_khronos),
            ("x-argus", headers.x_argus),
            ("x-ladon", headers.x_ladon),
            ("x-gorgon", headers.x_gorgon),
            ("content-type", "application/json; charset=utf-8".into()),
            ("user-agent", device.ua.clone()),
        ],
        body: body_json,
    };

    let response = transport.execute(request).await.map_err(|_| StageFailed(STAGE_SIGN))?;
    let device_guard_data0 = tokio::task::spawn_blocking(move || decode_guard_data(&response.body))
        .await
        .map_err(|_| StageFailed(STAGE_SIGN))??;

    Ok(SignOutcome { device_guard_data0, tt_ticket_guard_public_key, priv_key })
}

/// Parses the envelope, base64-decodes `tt-device-guard-server-data`, and
/// parses the decoded bytes as JSON in turn — offloaded alongside the rest
/// of stage 3's CPU-bound work.
fn decode_guard_data(body: &str) -> Result<Value, StageFailed> {
    let parsed: Value = serde_json::from_str(body).map_err(|_| StageFailed(STAGE_SIGN))?;
    let encoded = parsed
        .get("tt-device-guard-server-data")
        .and_then(Value::as_str)
        .ok_or(StageFailed(STAGE_SIGN))?;

    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    let decoded = BASE64.decode(encoded).map_err(|_| StageFailed(STAGE_SIGN))?;
    serde_json::from_slice(&decoded).map_err(|_| StageFailed(STAGE_SIGN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fakes::ScriptedTransport;
    use devpool_models::DeviceRecord;

    fn sample_device() -> DeviceRecord {
        DeviceRecord {
            cdid: "cdid-1".into(),
            openudid: "openudid-1".into(),
            clientudid: "clientudid-1".into(),
            device_uid: "uid-1".into(),
            device_type: "SM-G991B".into(),
            device_brand: "samsung".into(),
            device_manufacturer: "samsung".into(),
            os_api: 30,
            os_version: "11".into(),
            resolution: "1080*2400".into(),
            resolution_v2: "1080*2400".into(),
            dpi: 420,
            rom: "G991BXXU".into(),
            rom_version: "G991BXXU4BVA1".into(),
            ram_size: "8192".into(),
            screen_width_dp: 360,
            screen_height_dp: 800,
            google_aid: "aid-1".into(),
            package: "com.zhiliaoapp.musically".into(),
            version_name: "35.2.5".into(),
            version_code: "350205".into(),
            update_version_code: "2023502050".into(),
            sdk_version: "12.8.0".into(),
            sdk_version_code: "120800".into(),
            sdk_target_version: "30".into(),
            sdk_flavor: "i18nInner".into(),
            release_build: "20_23_02_09".into(),
            apk_first_install_time: 1_700_000_000_000,
            apk_last_update_time: 1_700_000_000_000,
            web_ua: "Mozilla/5.0".into(),
            ua: "com.zhiliaoapp.musically/350205".into(),
            region: "US".into(),
            language: "en".into(),
            timezone_name: "America/New_York".into(),
            timezone_offset: -14400,
            device_id: None,
            install_id: None,
        }
    }

    #[tokio::test]
    async fn register_parses_device_and_install_id() {
        let transport = ScriptedTransport::new(vec![r#"{"device_id":123,"install_id":456}"#]);
        let device = sample_device();
        let (device_id, install_id) = register(&transport, &device, 1_700_000_000_000).await.unwrap();
        assert_eq!(device_id, "123");
        assert_eq!(install_id, "456");
    }

    #[tokio::test]
    async fn register_rejects_zero_device_id() {
        let transport = ScriptedTransport::new(vec![r#"{"device_id":0,"install_id":456}"#]);
        let device = sample_device();
        let result = register(&transport, &device, 1_700_000_000_000).await;
        assert_eq!(result.unwrap_err(), StageFailed(STAGE_REGISTER));
    }

    #[tokio::test]
    async fn alert_check_accepts_exact_success_body() {
        let transport = ScriptedTransport::new(vec![r#"{"message":"success"}"#]);
        let device = sample_device();
        let result = alert_check(&transport, &device, "123", "456", 1_700_000_000_000).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn alert_check_rejects_any_other_body() {
        let transport = ScriptedTransport::new(vec![r#"{"message":"retry"}"#]);
        let device = sample_device();
        let result = alert_check(&transport, &device, "123", "456", 1_700_000_000_000).await;
        assert_eq!(result.unwrap_err(), StageFailed(STAGE_ALERT_CHECK));
    }

    #[tokio::test]
    async fn sign_decodes_base64_guard_data() {
        use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
        let inner = serde_json::json!({"guard": "payload"});
        let encoded = BASE64.encode(serde_json::to_vec(&inner).unwrap());
        let response_body = serde_json::json!({"tt-device-guard-server-data": encoded}).to_string();
        let transport = ScriptedTransport::new(vec![response_body.as_str()]);
        let device = sample_device();
        let outcome = sign(&transport, &device, "123", "456", 1_700_000_000_000).await.unwrap();
        assert_eq!(outcome.device_guard_data0, inner);
        assert!(!outcome.tt_ticket_guard_public_key.is_empty());
        assert_eq!(outcome.priv_key.len(), 64);
    }

    #[tokio::test]
    async fn sign_fails_when_guard_data_field_missing() {
        let transport = ScriptedTransport::new(vec![r#"{}"#]);
        let device = sample_device();
        let result = sign(&transport, &device, "123", "456", 1_700_000_000_000).await;
        assert_eq!(result.unwrap_err(), StageFailed(STAGE_SIGN));
    }
}
