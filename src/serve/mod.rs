//! Static preview server with live-reload injection.
//!
//! Serves the output tree over HTTP. HTML responses get the reload client
//! injected before `</body>`; the client itself is served from memory at
//! `/__kiln/livereload.js`.

mod browser;
mod inject;
mod path;
mod response;

pub use browser::open_browser;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Request, Server};

use crate::embed::serve::LIVERELOAD_PATH;
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Worker threads answering requests.
const REQUEST_THREADS: usize = 4;

/// What the request loop serves.
#[derive(Debug, Clone)]
pub struct Site {
    /// Absolute serve root.
    pub root: PathBuf,
    /// Reload WebSocket port; `None` serves pages untouched.
    pub reload_port: Option<u16>,
}

/// A bound HTTP server whose request loop has not started yet.
pub struct PreviewServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

impl PreviewServer {
    pub fn bind(interface: IpAddr, port: u16) -> Result<Self> {
        let (server, addr) = bind_with_retry(interface, port)?;
        Ok(Self {
            server: Arc::new(server),
            addr,
        })
    }

    #[cfg(test)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Browser-facing URL; wildcard binds are shown as `localhost`.
    pub fn url(&self) -> String {
        if self.addr.ip().is_unspecified() {
            format!("http://localhost:{}", self.addr.port())
        } else {
            format!("http://{}", self.addr)
        }
    }

    /// Shared handle, used to unblock the request loop on shutdown.
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Run the request loop on a background thread.
    pub fn start(self, site: Site) -> Result<JoinHandle<()>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(REQUEST_THREADS)
            .thread_name(|i| format!("kiln-http-{i}"))
            .build()
            .context("failed to create request thread pool")?;
        let site = Arc::new(site);

        let handle = thread::Builder::new()
            .name("kiln-http".into())
            .spawn(move || {
                for request in self.server.incoming_requests() {
                    let site = Arc::clone(&site);
                    pool.spawn(move || {
                        if let Err(e) = handle_request(request, &site) {
                            crate::debug!("serve"; "request error: {e}");
                        }
                    });
                }
            })
            .context("failed to spawn http thread")?;
        Ok(handle)
    }
}

fn handle_request(request: Request, site: &Site) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !response::is_get_or_head(&request) {
        return response::respond_method_not_allowed(request);
    }

    crate::debug!("serve"; "{} {}", request.method(), request.url());

    if let Some(port) = site.reload_port
        && request.url().split('?').next() == Some(LIVERELOAD_PATH)
    {
        return response::respond_livereload_js(request, port);
    }

    let reload = site.reload_port.is_some();
    if let Some(path) = path::resolve_path(request.url(), &site.root) {
        return response::respond_file(request, &path, reload);
    }

    response::respond_not_found(request, &site.root, reload)
}

/// Bind to the interface and port, trying the next ports when taken.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let bound = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, bound));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
