// [libs/core/signing/src/adapter.rs]
//! Stand-in for the opaque `make_headers` request-signing primitive used by
//! `original_source/register_logic.py`. The real algorithm is a closed,
//! per-release-obfuscated implementation — out of scope here (spec
//! Non-goals: reproducing the proprietary signature algorithm). This adapter
//! exists only so the handshake (domain layer) has a stable, deterministic,
//! pure function with the right shape to build and test against: same
//! inputs always produce the same five header values, and no header value
//! is ever derived from wall-clock time, randomness, or cached state other
//! than what's passed in.

use sha2::{Digest, Sha256};

/// The five signing headers the device-guard endpoints expect on every
/// stage of the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub x_ss_stub: String,
    pub x_khronos: String,
    pub x_argus: String,
    pub x_ladon: String,
    pub x_gorgon: String,
}

/// Derives the five signing headers from the request's signable surface.
///
/// `device_id` is empty-string-accepted: Stage 1 (register) signs before a
/// `device_id` has been assigned, later stages sign with it populated.
pub fn sign_request(
    device_id: &str,
    timestamp: i64,
    sign_count: u64,
    query_string: &str,
    body_hex: &str,
) -> SignedHeaders {
    let digest = |label: &str| -> String {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        hasher.update(device_id.as_bytes());
        hasher.update(timestamp.to_string().as_bytes());
        hasher.update(sign_count.to_string().as_bytes());
        hasher.update(query_string.as_bytes());
        hasher.update(body_hex.as_bytes());
        hex::encode(hasher.finalize())
    };

    SignedHeaders {
        x_ss_stub: digest("ss_stub")[..16].to_string(),
        x_khronos: timestamp.to_string(),
        x_argus: digest("argus"),
        x_ladon: digest("ladon")[..40].to_string(),
        x_gorgon: digest("gorgon")[..32].to_string(),
    }
}
