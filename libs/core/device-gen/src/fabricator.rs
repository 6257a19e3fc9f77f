// [libs/core/device-gen/src/fabricator.rs]
//! Fabricates synthetic device identities. Pure, stateless, no I/O — one
//! call in, one `DeviceRecord` out. Grounded on the shape of
//! `original_source/generate_devices_bulk.py::_gen_one_device`, which
//! always sets `device_uid` from `cdid`/`clientudid`/a fresh uuid before
//! handing the record onward; the hardware/app/locale field values
//! themselves are internal design, since the source's `getANewDevice()` is
//! an opaque external dependency not present in the retrieval pack.

use devpool_models::DeviceRecord;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::profiles::{HANDSETS, OS_VERSIONS, REGIONS};

const PACKAGE: &str = "com.zhiliaoapp.musically";
const SDK_FLAVOR: &str = "i18nInner";

fn random_hex_id(rng: &mut impl Rng, len: usize) -> String {
    const CHARS: &[u8] = b"0123456789abcdef";
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

/// Builds one freshly fabricated device, ready for the registration
/// handshake. `device_id`/`install_id` are left unset until Stage 1
/// assigns them.
pub fn fabricate() -> DeviceRecord {
    let mut rng = rand::thread_rng();

    let handset = HANDSETS.choose(&mut rng).expect("HANDSETS is non-empty");
    let (os_version, os_api) = *OS_VERSIONS.choose(&mut rng).expect("OS_VERSIONS is non-empty");
    let (region, language, timezone_name, timezone_offset) =
        *REGIONS.choose(&mut rng).expect("REGIONS is non-empty");

    let cdid = random_hex_id(&mut rng, 32);
    let openudid = random_hex_id(&mut rng, 16);
    let clientudid = uuid::Uuid::new_v4().to_string();
    let google_aid = uuid::Uuid::new_v4().to_string();

    let now = chrono::Utc::now().timestamp();
    let install_jitter = rng.gen_range(0..30 * 86_400);
    let apk_first_install_time = now - install_jitter;
    let apk_last_update_time = apk_first_install_time + rng.gen_range(0..7 * 86_400);

    let version_code = "350205";
    let ua = format!(
        "com.zhiliaoapp.musically/{version_code} (Linux; U; Android {os_version}; {language}_{region}; {model}; Build/{build})",
        model = handset.model,
        build = random_hex_id(&mut rng, 8).to_uppercase(),
    );
    let web_ua = format!(
        "Mozilla/5.0 (Linux; Android {os_version}; {model}) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/100.0.0.0 Mobile Safari/537.36",
        model = handset.model,
    );

    let mut device = DeviceRecord {
        cdid: cdid.clone(),
        openudid,
        clientudid: clientudid.clone(),
        device_uid: String::new(),

        device_type: handset.model.to_string(),
        device_brand: handset.brand.to_string(),
        device_manufacturer: handset.manufacturer.to_string(),
        os_api,
        os_version: os_version.to_string(),
        resolution: handset.resolution.to_string(),
        resolution_v2: handset.resolution.to_string(),
        dpi: handset.dpi,
        rom: handset.rom.to_string(),
        rom_version: format!("{}.{}", os_version, rng.gen_range(0..9)),
        ram_size: handset.ram_size.to_string(),
        screen_width_dp: handset.screen_width_dp,
        screen_height_dp: handset.screen_height_dp,
        google_aid,

        package: PACKAGE.to_string(),
        version_name: "35.2.5".to_string(),
        version_code: version_code.to_string(),
        update_version_code: "3502005".to_string(),
        sdk_version: "3.5.2".to_string(),
        sdk_version_code: "352".to_string(),
        sdk_target_version: os_api.to_string(),
        sdk_flavor: SDK_FLAVOR.to_string(),
        release_build: random_hex_id(&mut rng, 10),
        apk_first_install_time,
        apk_last_update_time,
        web_ua,
        ua,

        region: region.to_string(),
        language: language.to_string(),
        timezone_name: timezone_name.to_string(),
        timezone_offset,

        device_id: None,
        install_id: None,
    };

    device.ensure_device_uid();
    device
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fabricates_with_device_uid_set() {
        let d = fabricate();
        assert!(!d.device_uid.is_empty());
        assert_eq!(d.device_uid, d.cdid);
    }

    #[test]
    fn fabricates_with_fixed_package() {
        let d = fabricate();
        assert_eq!(d.package, "com.zhiliaoapp.musically");
        assert_eq!(d.sdk_flavor, "i18nInner");
    }

    #[test]
    fn consecutive_calls_produce_distinct_identities() {
        let a = fabricate();
        let b = fabricate();
        assert_ne!(a.cdid, b.cdid);
        assert_ne!(a.device_uid, b.device_uid);
    }

    #[test]
    fn unregistered_device_has_no_device_id() {
        let d = fabricate();
        assert!(d.device_id.is_none());
        assert!(d.install_id.is_none());
        assert!(!d.is_registered());
    }
}
