// [libs/core/device-gen/src/profiles.rs]
//! Static pools of plausible hardware/app descriptors the fabricator draws
//! from. Values are representative Android handset specs, not pulled from
//! any single real device — internal design, not derived from the source
//! (no equivalent table was present in the retrieval pack's
//! `original_source/`, whose `getANewDevice()` is an external dependency).

pub struct HandsetProfile {
    pub brand: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub rom: &'static str,
    pub resolution: &'static str,
    pub dpi: u32,
    pub screen_width_dp: u32,
    pub screen_height_dp: u32,
    pub ram_size: &'static str,
}

pub const HANDSETS: &[HandsetProfile] = &[
    HandsetProfile {
        brand: "samsung",
        manufacturer: "samsung",
        model: "SM-G991B",
        rom: "samsungexynos2100",
        resolution: "1080*2400",
        dpi: 420,
        screen_width_dp: 360,
        screen_height_dp: 800,
        ram_size: "8192",
    },
    HandsetProfile {
        brand: "xiaomi",
        manufacturer: "xiaomi",
        model: "M2102J20SG",
        rom: "qcom",
        resolution: "1080*2400",
        dpi: 440,
        screen_width_dp: 392,
        screen_height_dp: 873,
        ram_size: "6144",
    },
    HandsetProfile {
        brand: "oppo",
        manufacturer: "OPPO",
        model: "CPH2173",
        rom: "mt6785",
        resolution: "1080*2400",
        dpi: 409,
        screen_width_dp: 360,
        screen_height_dp: 800,
        ram_size: "4096",
    },
    HandsetProfile {
        brand: "vivo",
        manufacturer: "vivo",
        model: "V2027A",
        rom: "qcom",
        resolution: "1080*2340",
        dpi: 409,
        screen_width_dp: 393,
        screen_height_dp: 830,
        ram_size: "8192",
    },
    HandsetProfile {
        brand: "realme",
        manufacturer: "realme",
        model: "RMX3085",
        rom: "qcom",
        resolution: "1080*2400",
        dpi: 409,
        screen_width_dp: 360,
        screen_height_dp: 800,
        ram_size: "6144",
    },
    HandsetProfile {
        brand: "oneplus",
        manufacturer: "OnePlus",
        model: "IN2023",
        rom: "qcom",
        resolution: "1440*3216",
        dpi: 560,
        screen_width_dp: 411,
        screen_height_dp: 919,
        ram_size: "12288",
    },
];

pub const OS_VERSIONS: &[(&str, u32)] = &[
    ("10", 29),
    ("11", 30),
    ("12", 31),
    ("13", 33),
];

pub const REGIONS: &[(&str, &str, &str, i32)] = &[
    // (region, language, timezone_name, timezone_offset_seconds)
    ("US", "en", "America/New_York", -14400),
    ("GB", "en", "Europe/London", 3600),
    ("ID", "in", "Asia/Jakarta", 25200),
    ("BR", "pt", "America/Sao_Paulo", -10800),
    ("VN", "vi", "Asia/Ho_Chi_Minh", 25200),
    ("PH", "en", "Asia/Manila", 28800),
];
