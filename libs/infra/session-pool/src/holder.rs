// [libs/infra/session-pool/src/holder.rs]
//! A reusable HTTP session plus a use counter. Grounded on
//! `libs/infra/worker-client/src/client.rs`'s `Client::builder()` idiom
//! (fixed user agent, per-call timeout); adds `.cookie_store(true)` since
//! the handshake threads cookies across its three stages (spec §4.4).

use crate::errors::SessionError;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "com.zhiliaoapp.musically/350205 (Linux; U; Android 11; en_US; Pixel 5; Build/RQ3A.210905.001)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A durable session checked out by at most one task at a time. Invariant
/// enforced by the pool's enqueue/dequeue discipline, not by this type.
pub struct SessionHolder {
    client: Option<reqwest::Client>,
    bound_proxy: Option<String>,
    pub used_tasks: u32,
}

impl SessionHolder {
    pub fn empty() -> Self {
        Self { client: None, bound_proxy: None, used_tasks: 0 }
    }

    /// Lazily constructs a client bound to `proxy` with the given
    /// transport-impersonation profile (`user_agent`) and optional TCP
    /// keepalive (`MWZZZH_IMPERSONATE`/`MWZZZH_KEEPALIVE`). Rebuilds if the
    /// bound proxy differs from a previous checkout (proxy rotation binds a
    /// fresh client per acquiring task, kept until `recycle()`).
    pub fn ensure(
        &mut self,
        proxy: Option<&str>,
        user_agent: &str,
        keepalive: Option<Duration>,
    ) -> Result<&reqwest::Client, SessionError> {
        let needs_rebuild = self.client.is_none() || self.bound_proxy.as_deref() != proxy;
        if needs_rebuild {
            let mut builder = reqwest::Client::builder()
                .user_agent(user_agent)
                .cookie_store(true)
                .tcp_keepalive(keepalive)
                .timeout(REQUEST_TIMEOUT);
            if let Some(proxy_url) = proxy {
                builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
            }
            self.client = Some(builder.build()?);
            self.bound_proxy = proxy.map(str::to_string);
        }
        Ok(self.client.as_ref().expect("just ensured"))
    }

    /// Tears the session down and clears its state. Failures here are
    /// best-effort and never surfaced (spec §4.3: tear-down errors are
    /// swallowed) — dropping the `Client` cannot itself fail.
    pub fn recycle(&mut self) {
        self.client = None;
        self.bound_proxy = None;
        self.used_tasks = 0;
    }
}
