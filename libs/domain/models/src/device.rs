// [libs/domain/models/src/device.rs]
//! Device Record and Provisioned Device.
//!
//! Field order here is not cosmetic: `serde_json` serializes a struct in
//! declaration order, and that order feeds the signature adapter and the
//! wire body verbatim (see `devpool-signing`). Keep it in sync with the
//! `header` block built in the register stage.

use serde::{Deserialize, Serialize};

/// A synthetic mobile-device identity, before or after registration.
///
/// Mandatory identifier triplet plus hardware/app/locale descriptors.
/// `device_id`/`install_id` are populated by Stage 1 of the handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub cdid: String,
    pub openudid: String,
    pub clientudid: String,
    /// Uniquely identifies this record across the system pre-registration.
    pub device_uid: String,

    pub device_type: String,
    pub device_brand: String,
    pub device_manufacturer: String,
    pub os_api: u32,
    pub os_version: String,
    pub resolution: String,
    pub resolution_v2: String,
    pub dpi: u32,
    pub rom: String,
    pub rom_version: String,
    pub ram_size: String,
    pub screen_width_dp: u32,
    pub screen_height_dp: u32,
    pub google_aid: String,

    pub package: String,
    pub version_name: String,
    pub version_code: String,
    pub update_version_code: String,
    pub sdk_version: String,
    pub sdk_version_code: String,
    pub sdk_target_version: String,
    pub sdk_flavor: String,
    pub release_build: String,
    pub apk_first_install_time: i64,
    pub apk_last_update_time: i64,
    pub web_ua: String,
    pub ua: String,

    pub region: String,
    pub language: String,
    pub timezone_name: String,
    pub timezone_offset: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_id: Option<String>,
}

impl DeviceRecord {
    /// Guarantees `device_uid` is set: falls back `cdid` -> `clientudid` ->
    /// a freshly minted identifier. The fabricator already sets it from
    /// `cdid`, so this only protects callers constructing records by hand
    /// (e.g. in tests or import paths).
    pub fn ensure_device_uid(&mut self) {
        if !self.device_uid.is_empty() {
            return;
        }
        if !self.cdid.is_empty() {
            self.device_uid = self.cdid.clone();
        } else if !self.clientudid.is_empty() {
            self.device_uid = self.clientudid.clone();
        } else {
            self.device_uid = uuid::Uuid::new_v4().simple().to_string();
        }
    }

    pub fn is_registered(&self) -> bool {
        self.device_id.is_some() && self.install_id.is_some()
    }
}

/// A Device Record augmented with remote-issued identifiers and the
/// stage-3 key material. Never mutated after construction by the core
/// pipeline; downstream consumers may bump `use_count` as a side column
/// in the store, not on this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedDevice {
    #[serde(flatten)]
    pub device: DeviceRecord,
    pub device_id: String,
    pub install_id: String,
    pub device_guard_data0: serde_json::Value,
    pub tt_ticket_guard_public_key: String,
    pub priv_key: String,
}

impl ProvisionedDevice {
    pub fn device_uid(&self) -> &str {
        &self.device.device_uid
    }
}
