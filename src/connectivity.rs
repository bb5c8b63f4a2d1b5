//! Reachability probe guarding all external calls.
//!
//! Every path that talks to the knowledge base runs behind this gate: on
//! failure the caller aborts immediately with a connectivity outcome rather
//! than issuing a query that will hang or fail obscurely. One probe, no
//! retry, no backoff.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

/// Well-known address used for the probe (Cloudflare DNS).
const PROBE_ADDR: &str = "1.1.1.1:53";

/// How long the probe is allowed to take.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// A TCP reachability probe. The default target is a fixed well-known
/// address; tests point it at a local listener instead.
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    addr: String,
    timeout: Duration,
}

impl Default for ConnectivityGate {
    fn default() -> Self {
        Self {
            addr: PROBE_ADDR.to_string(),
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl ConnectivityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Check whether the network is reachable. Boolean result only; the
    /// reason for an unreachable network is not interesting to callers.
    pub async fn check(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Connectivity probe to {} failed: {}", self.addr, e);
                false
            }
            Err(_) => {
                debug!("Connectivity probe to {} timed out", self.addr);
                false
            }
        }
    }
}
