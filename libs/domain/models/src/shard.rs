// [libs/domain/models/src/shard.rs]
//! Shard assignment: `shard(device_id) = CRC32(device_id) mod N`.
//!
//! Grounded on `original_source/generate_devices_bulk.py::_stable_shard`
//! (`zlib.crc32(key) & 0xFFFFFFFF % shards`) — same algorithm, same
//! "shards <= 1 always shard 0" guard.

/// Deterministic, idempotent: the same `device_id` always maps to the same
/// shard for a fixed `shard_count`. Never re-shuffled once computed.
pub fn shard_of(device_id: &str, shard_count: u32) -> u32 {
    if shard_count <= 1 {
        return 0;
    }
    crc32fast::hash(device_id.as_bytes()) % shard_count
}
