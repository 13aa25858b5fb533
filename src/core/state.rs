//! Process-wide shutdown state.
//!
//! `SHUTDOWN` is set once by the Ctrl+C handler. Long-running tasks
//! (`serve`, `default`) park in [`wait_for_shutdown`] until it flips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use tiny_http::Server;
use tokio::sync::Notify;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Wakes the task runner when shutdown is requested.
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        crate::log!("serve"; "shutting down...");
        request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Flag shutdown, unblock the HTTP server and wake the runner.
fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    if let Some(server) = SERVER.get() {
        server.unblock();
    }
    SHUTDOWN_NOTIFY.notify_waiters();
}

/// Register the HTTP server so shutdown can unblock its accept loop.
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Wait until shutdown is requested.
///
/// The `Notified` future is created before the flag check, so a request
/// landing in between still wakes it.
pub async fn wait_for_shutdown() {
    loop {
        let notified = SHUTDOWN_NOTIFY.notified();
        if is_shutdown() {
            return;
        }
        notified.await;
    }
}
