//! Network reachability checks consulted before every request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Answers whether the device currently has a network path.
pub trait Reachability: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Reachability that never blocks a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReachable;

impl Reachability for AlwaysReachable {
    fn is_reachable(&self) -> bool {
        true
    }
}

/// Shared online/offline flag.
///
/// Clones observe the same state, so a platform network monitor (or
/// [`Connectivity::probe`]) can update the flag while clients read it.
#[derive(Debug, Clone)]
pub struct Connectivity {
    online: Arc<AtomicBool>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            tracing::info!("Network reachability changed: online={}", online);
        }
    }

    /// Refreshes the flag by opening a TCP connection to `host:port`.
    ///
    /// Returns the new state.
    pub async fn probe(&self, host: &str, port: u16, wait: Duration) -> bool {
        let addr = format!("{}:{}", host, port);
        let online = matches!(timeout(wait, TcpStream::connect(&addr)).await, Ok(Ok(_)));
        if !online {
            tracing::debug!("Reachability probe to {} failed", addr);
        }
        self.set_online(online);
        online
    }
}

impl Reachability for Connectivity {
    fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
