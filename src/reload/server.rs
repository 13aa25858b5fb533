//! WebSocket Server for Live Reload
//!
//! Binding is separate from starting: the port is known (and reported)
//! before any pipeline can emit, and [`ReloadServer::start`] hands back the
//! [`Reloader`] that feeds the broadcaster.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::relay::Relay;
use super::{HotReloadMessage, ReloadEvent, Reloader};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Accept loop poll interval
const ACCEPT_POLL: Duration = Duration::from_millis(100);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// A bound, not yet accepting, reload server.
pub struct ReloadServer {
    listener: TcpListener,
    port: u16,
}

impl ReloadServer {
    /// Bind to `interface:base_port`, moving up to the next free port.
    pub fn bind(interface: IpAddr, base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
        if base_port != 0 && port != base_port {
            crate::log!("reload"; "port {} in use, using {} instead", base_port, port);
        }
        crate::debug!("reload"; "ws://{}:{}", interface, port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Spawn the acceptor and broadcaster threads.
    ///
    /// `serve_root` maps written stylesheet paths to URL paths.
    pub fn start(self, serve_root: PathBuf) -> Result<Reloader> {
        self.listener.set_nonblocking(true)?;

        let clients: Clients = Arc::new(Mutex::new(Vec::new()));
        let relay = Arc::new(Mutex::new(Relay::new(serve_root)));
        let (reloader, rx) = Reloader::channel();

        {
            let clients = Arc::clone(&clients);
            let relay = Arc::clone(&relay);
            thread::spawn(move || accept_loop(self.listener, clients, relay));
        }
        thread::spawn(move || broadcast_loop(rx, clients, relay));

        Ok(reloader)
    }
}

fn accept_loop(listener: TcpListener, clients: Clients, relay: Arc<Mutex<Relay>>) {
    while !crate::core::is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("reload"; "client connected: {}", addr);
                // Handshake and writes are blocking
                let _ = stream.set_nonblocking(false);
                let pending = relay.lock().pending();
                if let Some(ws) = handshake(stream, pending) {
                    let mut clients = clients.lock();
                    clients.push(ws);
                    crate::debug!("reload"; "clients: {}", clients.len());
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                crate::log!("reload"; "accept error: {}", e);
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

/// Upgrade the connection and greet the client, replaying any unresolved
/// build error.
fn handshake(
    stream: TcpStream,
    pending: Option<HotReloadMessage>,
) -> Option<WebSocket<TcpStream>> {
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::debug!("reload"; "handshake failed: {}", e);
            return None;
        }
    };

    let greeting = std::iter::once(HotReloadMessage::connected()).chain(pending);
    for msg in greeting {
        if let Err(e) = ws.send(Message::Text(msg.to_json().into())) {
            crate::debug!("reload"; "failed to greet client: {}", e);
            return None;
        }
    }
    Some(ws)
}

fn broadcast_loop(rx: Receiver<ReloadEvent>, clients: Clients, relay: Arc<Mutex<Relay>>) {
    for event in rx {
        let messages = relay.lock().handle(event);
        for msg in messages {
            broadcast(&clients, &msg);
        }
    }
}

/// Send to every client, dropping the ones that went away.
fn broadcast(clients: &Clients, msg: &HotReloadMessage) {
    let mut clients = clients.lock();
    if clients.is_empty() {
        crate::debug!("reload"; "no clients connected");
        return;
    }

    let frame = Message::Text(msg.to_json().into());
    clients.retain_mut(|ws| match ws.send(frame.clone()) {
        Ok(()) => true,
        Err(e) => {
            crate::debug!("reload"; "client disconnected: {}", e);
            false
        }
    });
    crate::debug!("reload"; "broadcast to {} clients", clients.len());
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
