//! Host Reachability Abstraction
//!
//! Provides network-level liveness checks for library hosts.

use async_trait::async_trait;

/// Network connection status of a single host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Host answered within the probe timeout
    Connected,
    /// Host refused the connection or did not answer in time
    Disconnected,
    /// Address could not be resolved or parsed
    Indeterminate,
}

/// Host probe trait
///
/// Answers whether a library host is reachable at the network level before
/// any application-level request is attempted. Probes are bounded by a
/// timeout and never retried.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::network::HostProbe;
///
/// async fn should_fetch(probe: &dyn HostProbe) -> bool {
///     probe.is_reachable("192.168.1.10:8080").await
/// }
/// ```
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Probe `address` (`host` or `host:port`)
    async fn probe(&self, address: &str) -> NetworkStatus;

    /// Check if the host answered the probe
    async fn is_reachable(&self, address: &str) -> bool {
        matches!(self.probe(address).await, NetworkStatus::Connected)
    }
}
