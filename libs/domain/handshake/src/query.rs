// [libs/domain/handshake/src/query.rs]
//! Per-stage query-string parameter lists, carried over field-for-field
//! from `original_source/register_logic.py`'s three `query_string1`
//! f-strings.

use devpool_models::DeviceRecord;
use devpool_signing::canonical_query_string;

pub struct StageTimes {
    pub ts_seconds: i64,
    pub rticket_millis: i64,
    pub req_id: String,
}

impl StageTimes {
    pub fn capture(now_millis: i64) -> Self {
        StageTimes {
            ts_seconds: now_millis / 1000,
            rticket_millis: now_millis,
            req_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

fn last_install_time(device: &DeviceRecord) -> i64 {
    device.apk_last_update_time / 1000
}

/// Stage 1 (register) and stage 2 (activation check) share the same
/// 41-parameter base list in the source; stage 2 additionally appends
/// `device_id`/`install_id` per spec §4.4.
fn base_query_pairs<'a>(device: &'a DeviceRecord, times: &'a StageTimes) -> Vec<(&'static str, String)> {
    vec![
        ("rticket", times.rticket_millis.to_string()),
        ("ab_version", device.version_name.clone()),
        ("ac", "wifi".into()),
        ("ac2", "wifi".into()),
        ("aid", "1233".into()),
        ("app_language", "en".into()),
        ("app_name", "musical_ly".into()),
        ("app_type", "normal".into()),
        ("build_number", device.version_name.clone()),
        ("carrier_region", "US".into()),
        ("carrier_region_v2", "310".into()),
        ("cdid", device.cdid.clone()),
        ("channel", "googleplay".into()),
        ("device_brand", device.device_brand.clone()),
        ("device_platform", "android".into()),
        ("device_type", device.device_type.clone()),
        ("dpi", device.dpi.to_string()),
        ("host_abi", "arm64-v8a".into()),
        ("is_pad", "0".into()),
        ("language", "en".into()),
        ("last_install_time", last_install_time(device).to_string()),
        ("locale", "en".into()),
        ("manifest_version_code", device.update_version_code.clone()),
        ("mcc_mnc", "310004".into()),
        ("op_region", "US".into()),
        ("openudid", device.openudid.clone()),
        ("os", "android".into()),
        ("os_api", device.os_api.to_string()),
        ("os_version", device.os_version.clone()),
        ("redirect_from_idc", "maliva".into()),
        ("region", "US".into()),
        ("req_id", times.req_id.clone()),
        ("resolution", device.resolution.clone()),
        ("ssmix", "a".into()),
        ("sys_region", "US".into()),
        ("timezone_name", device.timezone_name.clone()),
        ("timezone_offset", device.timezone_offset.to_string()),
        ("ts", times.ts_seconds.to_string()),
        ("uoo", "0".into()),
        ("update_version_code", device.update_version_code.clone()),
        ("version_code", device.version_code.clone()),
        ("version_name", device.version_name.clone()),
    ]
}

pub fn register_query_string(device: &DeviceRecord, times: &StageTimes) -> String {
    let pairs = base_query_pairs(device, times);
    let refs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    canonical_query_string(&refs)
}

pub fn alert_check_query_string(
    device: &DeviceRecord,
    times: &StageTimes,
    device_id: &str,
    install_id: &str,
) -> String {
    let mut pairs = base_query_pairs(device, times);
    pairs.push(("device_id", device_id.to_string()));
    pairs.push(("install_id", install_id.to_string()));
    let refs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    canonical_query_string(&refs)
}

/// Stage 3's parameter list diverges from the shared base (different key
/// set and order), carried over from `make_ds_sign`'s own `query_string1`,
/// including its literal `from=normal&from_error` prefix — `from_error` is
/// a bare flag with no `=value` in the source string, so it's spliced in
/// ahead of the canonicalized tail rather than run through
/// `canonical_query_string`, which always pairs a key with a value.
pub fn sign_query_string(
    device: &DeviceRecord,
    times: &StageTimes,
    device_id: &str,
    install_id: &str,
) -> String {
    let pairs: Vec<(&str, String)> = vec![
        ("device_platform", "android".into()),
        ("os", "android".into()),
        ("ssmix", "a".into()),
        ("_rticket", times.rticket_millis.to_string()),
        ("cdid", device.cdid.clone()),
        ("channel", "googleplay".into()),
        ("aid", "1233".into()),
        ("app_name", "musical_ly".into()),
        ("version_code", device.version_code.clone()),
        ("version_name", device.version_name.clone()),
        ("manifest_version_code", device.update_version_code.clone()),
        ("update_version_code", device.update_version_code.clone()),
        ("ab_version", device.version_name.clone()),
        ("resolution", device.resolution.clone()),
        ("dpi", device.dpi.to_string()),
        ("device_type", device.device_type.clone()),
        ("device_brand", device.device_brand.clone()),
        ("language", "en".into()),
        ("os_api", device.os_api.to_string()),
        ("os_version", device.os_version.clone()),
        ("ac", "wifi".into()),
        ("is_pad", "0".into()),
        ("app_type", "normal".into()),
        ("sys_region", "US".into()),
        ("last_install_time", last_install_time(device).to_string()),
        ("mcc_mnc", "310004".into()),
        ("timezone_name", device.timezone_name.clone()),
        ("carrier_region_v2", "310".into()),
        ("app_language", "en".into()),
        ("carrier_region", "US".into()),
        ("ac2", "wifi".into()),
        ("uoo", "0".into()),
        ("op_region", "US".into()),
        ("timezone_offset", device.timezone_offset.to_string()),
        ("build_number", device.version_name.clone()),
        ("host_abi", "arm64-v8a".into()),
        ("locale", "en".into()),
        ("region", "US".into()),
        ("ts", times.ts_seconds.to_string()),
        ("iid", install_id.to_string()),
        ("device_id", device_id.to_string()),
        ("openudid", device.openudid.clone()),
    ];
    let refs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    format!("from=normal&from_error&{}", canonical_query_string(&refs))
}
