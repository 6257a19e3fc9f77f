// [libs/domain/handshake/src/wire.rs]
//! Wire body shapes for the three handshake stages. Structs, not dynamic
//! maps (DESIGN NOTES §9: stable field order is what makes the body
//! reproducible for signing). Field order and names are carried over
//! field-for-field from `original_source/register_logic.py`'s
//! `body_dict`/`data` literals.

use devpool_models::DeviceRecord;
use serde::Serialize;

#[derive(Serialize)]
pub struct RegisterBody {
    pub header: RegisterHeader,
    pub magic_tag: &'static str,
    #[serde(rename = "_gen_time")]
    pub gen_time: i64,
}

#[derive(Serialize)]
pub struct RegisterHeader {
    pub os: &'static str,
    pub os_version: String,
    pub os_api: u32,
    pub device_model: String,
    pub device_brand: String,
    pub device_manufacturer: String,
    pub cpu_abi: &'static str,
    pub density_dpi: u32,
    pub display_density: &'static str,
    pub resolution: String,
    pub display_density_v2: &'static str,
    pub resolution_v2: String,
    pub access: &'static str,
    pub rom: String,
    pub rom_version: String,
    pub language: &'static str,
    pub timezone: i32,
    pub region: &'static str,
    pub tz_name: String,
    pub tz_offset: i32,
    pub clientudid: String,
    pub openudid: String,
    pub channel: &'static str,
    pub not_request_sender: u8,
    pub aid: u32,
    pub release_build: String,
    pub ab_version: String,
    pub google_aid: String,
    pub gaid_limited: u8,
    pub custom: RegisterHeaderCustom,
    pub package: &'static str,
    pub app_version: String,
    pub app_version_minor: &'static str,
    pub version_code: i64,
    pub update_version_code: i64,
    pub manifest_version_code: i64,
    pub app_name: &'static str,
    pub tweaked_channel: &'static str,
    pub display_name: &'static str,
    pub cdid: String,
    pub device_platform: &'static str,
    pub sdk_version_code: String,
    pub sdk_target_version: String,
    pub req_id: String,
    pub sdk_version: String,
    pub guest_mode: u8,
    pub sdk_flavor: String,
    pub apk_first_install_time: i64,
    pub is_system_app: u8,
}

#[derive(Serialize)]
pub struct RegisterHeaderCustom {
    pub ram_size: String,
    pub dark_mode_setting_value: u8,
    pub is_foldable: u8,
    pub screen_height_dp: u32,
    pub apk_last_update_time: i64,
    pub filter_warn: u8,
    pub priority_region: &'static str,
    pub user_period: u8,
    pub is_kids_mode: u8,
    pub web_ua: String,
    pub screen_width_dp: u32,
    pub user_mode: u8,
}

pub const AID: u32 = 1233;

impl RegisterBody {
    pub fn from_device(device: &DeviceRecord, req_id: &str, gen_time: i64) -> Self {
        let version_code: i64 = device.version_code.parse().unwrap_or(0);
        let update_version_code: i64 = device.update_version_code.parse().unwrap_or(0);
        RegisterBody {
            header: RegisterHeader {
                os: "Android",
                os_version: device.os_version.clone(),
                os_api: device.os_api,
                device_model: device.device_type.clone(),
                device_brand: device.device_brand.clone(),
                device_manufacturer: device.device_manufacturer.clone(),
                cpu_abi: "arm64-v8a",
                density_dpi: device.dpi,
                display_density: "mdpi",
                resolution: device.resolution.clone(),
                display_density_v2: "xxhdpi",
                resolution_v2: device.resolution_v2.clone(),
                access: "wifi",
                rom: device.rom.clone(),
                rom_version: device.rom_version.clone(),
                language: "en",
                timezone: device.timezone_offset / 3600,
                region: "US",
                tz_name: device.timezone_name.clone(),
                tz_offset: device.timezone_offset,
                clientudid: device.clientudid.clone(),
                openudid: device.openudid.clone(),
                channel: "googleplay",
                not_request_sender: 1,
                aid: AID,
                release_build: device.release_build.clone(),
                ab_version: device.version_name.clone(),
                google_aid: device.google_aid.clone(),
                gaid_limited: 0,
                custom: RegisterHeaderCustom {
                    ram_size: device.ram_size.clone(),
                    dark_mode_setting_value: 1,
                    is_foldable: 0,
                    screen_height_dp: device.screen_height_dp,
                    apk_last_update_time: device.apk_last_update_time,
                    filter_warn: 0,
                    priority_region: "US",
                    user_period: 0,
                    is_kids_mode: 0,
                    web_ua: device.web_ua.clone(),
                    screen_width_dp: device.screen_width_dp,
                    user_mode: 1,
                },
                package: "com.zhiliaoapp.musically",
                app_version: device.version_name.clone(),
                app_version_minor: "",
                version_code,
                update_version_code,
                manifest_version_code: update_version_code,
                app_name: "musical_ly",
                tweaked_channel: "googleplay",
                display_name: "TikTok",
                cdid: device.cdid.clone(),
                device_platform: "android",
                sdk_version_code: device.sdk_version_code.clone(),
                sdk_target_version: device.sdk_target_version.clone(),
                req_id: req_id.to_string(),
                sdk_version: device.sdk_version.clone(),
                guest_mode: 0,
                sdk_flavor: device.sdk_flavor.clone(),
                apk_first_install_time: device.apk_first_install_time,
                is_system_app: 0,
            },
            magic_tag: "ss_app_log",
            gen_time,
        }
    }
}

#[derive(Serialize)]
pub struct SignBody {
    pub device_id: String,
    pub install_id: String,
    pub aid: u32,
    pub app_version: String,
    pub model: String,
    pub os: &'static str,
    pub openudid: String,
    pub google_aid: String,
    pub properties_version: &'static str,
    pub device_properties: DeviceProperties,
}

/// SHA-256 hashes of a handful of selected attributes plus a fixed set of
/// opaque constants carried over verbatim from the captured fixture — they
/// are inert payload bytes, not derived from anything (DESIGN NOTES §9
/// Open Question resolution).
#[derive(Serialize)]
pub struct DeviceProperties {
    pub device_model: String,
    pub device_manufacturer: String,
    pub disk_size: &'static str,
    pub memory_size: &'static str,
    pub resolution: String,
    pub re_time: &'static str,
    pub indss18: &'static str,
    pub indc15: &'static str,
    pub indn5: &'static str,
    pub indmc14: &'static str,
    pub inda0: &'static str,
    pub indal2: &'static str,
    pub indm10: &'static str,
    pub indsp3: &'static str,
    pub indsd8: &'static str,
    pub bl: &'static str,
    pub cmf: &'static str,
    pub bc: &'static str,
    pub stz: &'static str,
    pub sl: &'static str,
}

impl DeviceProperties {
    pub fn for_device(device: &DeviceRecord) -> Self {
        use sha2::{Digest, Sha256};
        let sha256_hex = |s: &str| -> String {
            let mut hasher = Sha256::new();
            hasher.update(s.as_bytes());
            hex::encode(hasher.finalize())
        };
        DeviceProperties {
            device_model: sha256_hex(&device.device_type),
            device_manufacturer: sha256_hex(&device.device_manufacturer),
            disk_size: "ea489ffb302814b62320c02536989a3962de820f5a481eb5bac1086697d9aa3c",
            memory_size: "291cf975c42a1e788fdc454e3c7330d641db5f9f7ba06e37f7f388b3448bc374",
            resolution: sha256_hex(&device.resolution),
            re_time: "0af7de3d5239bb5542f0653e57c7c8b9",
            indss18: "8725063fe010181646c25d1f993e1589",
            indc15: "7874453cef13dddd56fcb3c7e8e99c28",
            indn5: "a9ca935c4885bbc1da2be687f153354c",
            indmc14: "e678d34e71a6943f1cab0bfa3c7a226b",
            inda0: "d0eac42291b9a88173d9914972a65d8b",
            indal2: "d7baecabd462bc9f960eaab4c81a55c5",
            indm10: "446ae4837d88b3b3988d57b9747e11cd",
            indsp3: "9861cb1513b66e9aaeb66ef048bfdd18",
            indsd8: "a15ec37e1115dea871970a39ec0769c4",
            bl: "a3d41c6f3e8c1892d2cc97469805b1f0",
            cmf: "5494690cb9b316eb618265ea11dc5146",
            bc: "1e2b66f4392214037884408109a383df",
            stz: "e6f9d2069f89b53a8e6f2c65929d2e50",
            sl: "2389ca43e5adab9de01d2dda7633ac39",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_body_field_order_keeps_os_before_os_version() {
        let device = sample_device();
        let body = RegisterBody::from_device(&device, "req-1", 1_700_000_000_000);
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.find("\"os\"").unwrap() < json.find("\"os_version\"").unwrap());
    }

    fn sample_device() -> DeviceRecord {
        DeviceRecord {
            cdid: "cdid1".into(),
            openudid: "open1".into(),
            clientudid: "client1".into(),
            device_uid: "cdid1".into(),
            device_type: "SM-G991B".into(),
            device_brand: "samsung".into(),
            device_manufacturer: "samsung".into(),
            os_api: 30,
            os_version: "11".into(),
            resolution: "1080*2400".into(),
            resolution_v2: "1080*2400".into(),
            dpi: 420,
            rom: "samsungexynos2100".into(),
            rom_version: "11.0".into(),
            ram_size: "8192".into(),
            screen_width_dp: 360,
            screen_height_dp: 800,
            google_aid: "aid-1".into(),
            package: "com.zhiliaoapp.musically".into(),
            version_name: "35.2.5".into(),
            version_code: "350205".into(),
            update_version_code: "3502005".into(),
            sdk_version: "3.5.2".into(),
            sdk_version_code: "352".into(),
            sdk_target_version: "30".into(),
            sdk_flavor: "i18nInner".into(),
            release_build: "abc123".into(),
            apk_first_install_time: 1_700_000_000,
            apk_last_update_time: 1_700_000_100,
            web_ua: "ua".into(),
            ua: "ua".into(),
            region: "US".into(),
            language: "en".into(),
            timezone_name: "America/New_York".into(),
            timezone_offset: -14400,
            device_id: None,
            install_id: None,
        }
    }
}
