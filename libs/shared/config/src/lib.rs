// [libs/shared/config/src/lib.rs]
//! Process-wide configuration. Replaces scattered env reads
//! (`original_source/mwzzzh_spider.py::_load_env_for_runtime` et al.) with
//! one frozen value parsed once at start-up and handed explicitly to every
//! component (spec §9: "global mutable state -> injected configuration").

mod proxies;

pub use proxies::{load_proxy_list, ProxyListError};

use clap::Parser;
use std::time::Duration;

/// Command-line/environment directives for the registrar binary.
///
/// Every field also reads from the environment variable named in its
/// `env = "..."` attribute (`apps/miner-worker/src/main.rs`'s directives
/// idiom), so the process can be driven entirely by `.env` in production.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Synthetic device registration and provisioning pipeline"
)]
pub struct Config {
    /// Max in-flight registration tasks.
    #[arg(long, env = "GEN_CONCURRENCY", default_value_t = 200)]
    pub gen_concurrency: u32,

    /// CPU-offload worker count. `None` resolves to `num_cpus::get() * 2`
    /// clamped to `[4, 64]`, matching
    /// `original_source/mwzzzh_spider.py::_auto_thread_pool_size`.
    #[arg(long, env = "GEN_THREAD_POOL_SIZE")]
    pub gen_thread_pool_size: Option<u32>,

    /// Per-shard fill target `T`. Prefers `DB_MAX_DEVICES`, falls back to
    /// `MAX_GENERATE`, defaults to 10000 (the Python script's own default).
    #[arg(long, env = "DB_MAX_DEVICES")]
    pub db_max_devices: Option<u64>,
    #[arg(long, env = "MAX_GENERATE")]
    pub max_generate: Option<u64>,

    /// Per-iteration batch cap `B`. Prefers `MWZZZH_POLL_BATCH_MAX`, falls
    /// back to `MWZZZH_TASKS`.
    #[arg(long, env = "MWZZZH_POLL_BATCH_MAX")]
    pub mwzzzh_poll_batch_max: Option<u32>,
    #[arg(long, env = "MWZZZH_TASKS")]
    pub mwzzzh_tasks: Option<u32>,

    /// Whether the fill-loop keeps running after the pool is topped up, or
    /// exits once `count(i) >= T` for every shard.
    #[arg(long, env = "MWZZZH_POLL_MODE", default_value_t = true)]
    pub mwzzzh_poll_mode: bool,

    /// Forces a single fill-loop iteration regardless of `poll_mode`.
    #[arg(long, env = "MWZZZH_POLL_ONCE", default_value_t = false)]
    pub mwzzzh_poll_once: bool,

    /// Sleep interval `I` (seconds) between fill-loop iterations.
    #[arg(long, env = "MWZZZH_POLL_INTERVAL_SEC", default_value_t = 30)]
    pub mwzzzh_poll_interval_sec: u64,

    /// Optional hard cap `M` on total registrations for the process.
    #[arg(long, env = "MWZZZH_POLL_MAX_TOTAL")]
    pub mwzzzh_poll_max_total: Option<u64>,

    /// libsql connection target: a local file path, `:memory:`, or a
    /// `libsql://`/`https://` remote Turso URL. `DB_HOST`/`DB_PORT`/
    /// `DB_USER` are accepted for interface parity with the original MySQL
    /// deployment but unused by the embedded/remote libsql backend, which
    /// bakes host/port/credentials into one connection string.
    #[arg(long, env = "DB_HOST", default_value = "device_pool.db")]
    pub db_host: String,
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,
    /// Remote access token when `db_host` is a `libsql://`/`https://` URL.
    #[arg(long, env = "DB_PASSWORD")]
    pub db_password: Option<String>,
    /// Accepted for interface parity; the typed `DeviceRecord` always
    /// serializes its own primary key, so this has no effect here.
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,
    /// Accepted for interface parity; the table name is fixed in `schema.rs`.
    #[arg(long, env = "DB_DEVICE_POOL_TABLE")]
    pub db_device_pool_table: Option<String>,
    #[arg(long, env = "DB_DEVICE_POOL_SHARDS", default_value_t = 1)]
    pub db_device_pool_shards: u8,
    /// Accepted for interface parity; `DeviceRecord`'s field name is fixed.
    #[arg(long, env = "DEVICE_ID_FIELD")]
    pub device_id_field: Option<String>,

    /// TCP keepalive applied to every session client, seconds.
    #[arg(long, env = "MWZZZH_KEEPALIVE")]
    pub mwzzzh_keepalive: Option<u64>,
    #[arg(long, env = "MWZZZH_SESSION_POOL_SIZE", default_value_t = 50)]
    pub mwzzzh_session_pool_size: usize,
    #[arg(long, env = "MWZZZH_SESSION_MAX_REQUESTS", default_value_t = 100)]
    pub mwzzzh_session_max_requests: u32,
    /// Selects a transport-impersonation profile name; resolved to a
    /// concrete user-agent string by the caller (the teacher stack carries
    /// no TLS-fingerprint-spoofing crate, so this governs the UA header
    /// only, not the TLS handshake).
    #[arg(long, env = "MWZZZH_IMPERSONATE")]
    pub mwzzzh_impersonate: Option<String>,

    #[arg(long, env = "SAVE_TO_FILE", default_value_t = false)]
    pub save_to_file: bool,
    #[arg(long, env = "DEVICE_BACKUP_DIR", default_value = "device_backups")]
    pub device_backup_dir: String,
    #[arg(long, env = "DEVICE_FILE_PREFIX", default_value = "devices")]
    pub device_file_prefix: String,
    #[arg(long, env = "PER_FILE_MAX", default_value_t = 50_000)]
    pub per_file_max: u64,
    #[arg(long, env = "DEVICE_FILE_SHARDS", default_value_t = 1)]
    pub device_file_shards: u32,
    #[arg(long, env = "MWZZZH_FILE_FSYNC", default_value_t = false)]
    pub mwzzzh_file_fsync: bool,

    /// Plain-text proxy list, one URL per line. Empty/missing is fatal.
    #[arg(long, env = "PROXY_LIST_PATH", default_value = "proxies.txt")]
    pub proxy_list_path: String,
}

impl Config {
    /// Loads `.env` (if present) before parsing, matching
    /// `original_source/mwzzzh_spider.py::_load_env_for_runtime`'s
    /// "local file overrides nothing already in the real environment"
    /// semantics (`dotenvy::dotenv()` never overrides an existing var).
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Config::parse()
    }

    pub fn fill_target_per_shard(&self) -> u64 {
        self.db_max_devices.or(self.max_generate).unwrap_or(10_000)
    }

    pub fn fill_batch_max(&self) -> u32 {
        self.mwzzzh_poll_batch_max.or(self.mwzzzh_tasks).unwrap_or(200)
    }

    /// `num_cpus::get() * 2` clamped to `[4, 64]`, the same formula and
    /// clamp as `original_source/mwzzzh_spider.py::_auto_thread_pool_size`.
    pub fn resolved_thread_pool_size(&self) -> u32 {
        self.gen_thread_pool_size
            .unwrap_or_else(|| (num_cpus::get() as u32 * 2).clamp(4, 64))
    }

    pub fn session_keepalive(&self) -> Option<Duration> {
        self.mwzzzh_keepalive.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_target_prefers_db_max_devices_over_max_generate() {
        let mut config = Config::parse_from(["registrar"]);
        config.db_max_devices = Some(500);
        config.max_generate = Some(999);
        assert_eq!(config.fill_target_per_shard(), 500);
    }

    #[test]
    fn fill_target_falls_back_to_default() {
        let config = Config::parse_from(["registrar"]);
        assert_eq!(config.fill_target_per_shard(), 10_000);
    }

    #[test]
    fn thread_pool_size_honors_explicit_override() {
        let mut config = Config::parse_from(["registrar"]);
        config.gen_thread_pool_size = Some(12);
        assert_eq!(config.resolved_thread_pool_size(), 12);
    }

    #[test]
    fn thread_pool_size_auto_clamps_to_floor() {
        let config = Config::parse_from(["registrar"]);
        assert!(config.resolved_thread_pool_size() >= 4);
    }
}
