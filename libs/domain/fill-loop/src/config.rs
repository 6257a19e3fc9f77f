// [libs/domain/fill-loop/src/config.rs]
use std::time::Duration;

/// Inputs to one fill-loop run (spec §4.8). Independent of `devpool_config`
/// so this crate stays usable from tests without pulling in `clap`/`env`
/// parsing.
#[derive(Debug, Clone)]
pub struct FillLoopConfig {
    pub shard_count: u32,
    pub target_per_shard: u64,
    pub batch_max: u32,
    pub interval: Duration,
    pub hard_cap: Option<u64>,
    pub run_once: bool,
}
