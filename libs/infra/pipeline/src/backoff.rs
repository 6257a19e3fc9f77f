// [libs/infra/pipeline/src/backoff.rs]
//! Exponential backoff, base 1s cap 30s. A local three-line helper rather
//! than a crate — the teacher doesn't pull in `backoff`/`tokio-retry`
//! anywhere, and the policy doesn't need one (spec §4.5).

use std::time::Duration;

const BASE: Duration = Duration::from_secs(1);
const CAP: Duration = Duration::from_secs(30);

pub fn delay_for_attempt(attempt: u32) -> Duration {
    let scaled = BASE.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
    scaled.min(CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_exponentially_then_caps() {
        assert_eq!(delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(delay_for_attempt(5), Duration::from_secs(30));
        assert_eq!(delay_for_attempt(30), Duration::from_secs(30));
    }
}
