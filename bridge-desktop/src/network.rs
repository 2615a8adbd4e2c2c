//! Host Probe Implementation

use async_trait::async_trait;
use bridge_traits::network::{HostProbe, NetworkStatus};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;

/// TCP connect based host probe
///
/// ICMP echo needs raw sockets (elevated privileges on most desktops), so the
/// probe opens and immediately drops a TCP connection instead. Addresses
/// without an explicit port are probed on `default_port`.
pub struct TcpHostProbe {
    timeout: Duration,
    default_port: u16,
}

impl TcpHostProbe {
    /// Create a probe with a 5 second timeout on port 80
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            default_port: 80,
        }
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    fn target(&self, address: &str) -> String {
        if address.parse::<SocketAddr>().is_ok() {
            return address.to_string();
        }
        match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => {
                address.to_string()
            }
            _ if address.contains(':') => format!("[{}]:{}", address, self.default_port),
            _ => format!("{}:{}", address, self.default_port),
        }
    }
}

impl Default for TcpHostProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostProbe for TcpHostProbe {
    async fn probe(&self, address: &str) -> NetworkStatus {
        let target = self.target(address);

        let addrs: Vec<SocketAddr> = match timeout(self.timeout, lookup_host(target.as_str())).await {
            Ok(Ok(addrs)) => addrs.collect(),
            _ => {
                debug!(target = %target, "Host could not be resolved");
                return NetworkStatus::Indeterminate;
            }
        };

        let Some(addr) = addrs.first() else {
            return NetworkStatus::Indeterminate;
        };

        let status = match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => NetworkStatus::Connected,
            Ok(Err(_)) | Err(_) => NetworkStatus::Disconnected,
        };

        debug!(target = %target, status = ?status, "Host probed");
        status
    }
}
