//! `[serve]` section configuration.
//!
//! Contains preview server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! root = "./dist/"            # Directory served over HTTP
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8000                 # HTTP port number
//! reload_port = 35729         # Live-reload WebSocket port
//! open = true                 # Open a browser once the server is up
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Directory served over HTTP, relative to the project root.
    pub root: PathBuf,

    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for live reload.
    pub reload_port: u16,

    /// Open the served URL in a browser.
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./dist/"),
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
            reload_port: 35729,
            open: true,
        }
    }
}
