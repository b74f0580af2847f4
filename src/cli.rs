//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through an environment variable;
//! flags win over the environment, which wins over the defaults.
//!
//! ```bash
//! filehttp --port 9000 --root ./public
//! PORT=9000 ROOT_DIR=/srv/public filehttp
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::server::{Error, ServerConfig, DEFAULT_ROOT_DIR, MAX_CONNECTIONS, MAX_READ_BUFFER_SIZE};

/// Serve the files under a directory over HTTP/1.1.
#[derive(Debug, Clone, Parser)]
#[command(name = "filehttp", version, about)]
pub struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0", env = "BIND_ADDRESS")]
    pub address: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    pub port: u16,

    /// Directory whose contents are served
    #[arg(short, long, default_value = DEFAULT_ROOT_DIR, env = "ROOT_DIR")]
    pub root: PathBuf,

    /// Maximum number of concurrent connections
    #[arg(long, default_value_t = 1024, env = "MAX_CONNECTIONS",
          value_parser = clap::value_parser!(u64).range(1..=MAX_CONNECTIONS as u64))]
    pub max_connections: u64,

    /// Maximum request-line length in bytes
    #[arg(long, default_value_t = 8192, env = "READ_BUFFER_SIZE",
          value_parser = clap::value_parser!(u64).range(16..=MAX_READ_BUFFER_SIZE as u64))]
    pub read_buffer_size: u64,

    /// Seconds to wait for the request line, 0 to wait forever
    #[arg(long, default_value_t = 30, env = "READ_TIMEOUT")]
    pub read_timeout: u64,
}

impl Args {
    /// Turn parsed arguments into a server configuration.
    ///
    /// A relative root is anchored at the current directory and trailing
    /// separators are dropped. Whether the root exists is checked when the
    /// server is created.
    pub fn into_config(self) -> Result<ServerConfig, Error> {
        let root_dir = absolute_root(&self.root)?;

        let config = ServerConfig {
            bind_address: self.address,
            port: self.port,
            root_dir,
            max_connections: to_usize("max_connections", self.max_connections)?,
            read_buffer_size: to_usize("read_buffer_size", self.read_buffer_size)?,
            read_timeout: (self.read_timeout > 0).then(|| Duration::from_secs(self.read_timeout)),
        };
        config.validate()?;
        Ok(config)
    }
}

fn to_usize(name: &str, value: u64) -> Result<usize, Error> {
    usize::try_from(value).map_err(|_| Error::InvalidConfig(format!("{name} {value} does not fit this platform")))
}

fn absolute_root(root: &Path) -> Result<PathBuf, Error> {
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::InvalidRoot {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?
            .join(root)
    };

    // Collecting the components drops trailing separators and `.` segments.
    Ok(root.components().collect())
}
