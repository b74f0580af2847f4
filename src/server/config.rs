//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::server::error::Error;

/// Default directory served when none is configured.
pub const DEFAULT_ROOT_DIR: &str = "/var/www/html";

/// Largest connection limit the server can enforce.
pub const MAX_CONNECTIONS: usize = Semaphore::MAX_PERMITS;

/// Largest read buffer, and so the longest request line, that can be configured.
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// HTTP server configuration.
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The address to bind to.
    pub bind_address: IpAddr,
    /// The port to listen on.
    pub port: u16,
    /// The directory whose contents are served. Absolute, without a trailing separator.
    pub root_dir: PathBuf,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size, which also caps the length of a request line.
    pub read_buffer_size: usize,
    /// How long to wait for the request line; `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl ServerConfig {
    /// The socket address the listener binds to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Check the limits that cannot be enforced past certain sizes.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections > MAX_CONNECTIONS {
            return Err(Error::InvalidConfig(format!(
                "max_connections {} exceeds {MAX_CONNECTIONS}",
                self.max_connections
            )));
        }
        if self.read_buffer_size == 0 || self.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(Error::InvalidConfig(format!(
                "read_buffer_size {} is outside 1..={MAX_READ_BUFFER_SIZE}",
                self.read_buffer_size
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            max_connections: 1024,
            read_buffer_size: 8192,
            read_timeout: Some(Duration::from_secs(30)),
        }
    }
}
