//! Live reload.
//!
//! Pipelines report outcomes through a [`Reloader`] handle; the reload
//! server turns them into messages for connected browsers.
//!
//! ```text
//! run_build ──notify/error──▶ Reloader ──crossbeam──▶ broadcaster ──ws──▶ Browser
//!                                                          ▲
//!                                   acceptor ──clients─────┘
//! ```
//!
//! # Modules
//!
//! - `message` - JSON messages sent to clients
//! - `relay` - Event to message translation and pending error tracking
//! - `server` - WebSocket acceptor and broadcaster threads

mod message;
mod relay;
mod server;

pub use message::HotReloadMessage;
pub use server::ReloadServer;

use std::path::PathBuf;

use crossbeam::channel::{self, Receiver, Sender};

use crate::core::AssetKind;

/// Pipeline outcome forwarded to the broadcaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    /// A kind rebuilt and wrote these absolute output paths.
    Changed { kind: AssetKind, paths: Vec<PathBuf> },
    /// A kind's build failed.
    Failed { kind: AssetKind, message: String },
    /// A kind that previously failed built again.
    Recovered(AssetKind),
}

/// Handle pipelines use to signal the reload subsystem.
///
/// Obtained from [`ReloadServer::start`]; one-shot builds use
/// [`Reloader::disabled`], which drops every signal.
#[derive(Debug, Clone, Default)]
pub struct Reloader {
    tx: Option<Sender<ReloadEvent>>,
}

impl Reloader {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A connected handle and the receiving end of its events.
    pub fn channel() -> (Self, Receiver<ReloadEvent>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Output of `kind` changed. Kinds that never reload are ignored.
    pub fn notify(&self, kind: AssetKind, paths: &[PathBuf]) {
        if kind.reloads() {
            self.send(ReloadEvent::Changed {
                kind,
                paths: paths.to_vec(),
            });
        }
    }

    /// A build of `kind` failed in watch mode.
    pub fn error(&self, kind: AssetKind, message: impl Into<String>) {
        self.send(ReloadEvent::Failed {
            kind,
            message: message.into(),
        });
    }

    /// A build of `kind` succeeded after a failure.
    pub fn clear_error(&self, kind: AssetKind) {
        self.send(ReloadEvent::Recovered(kind));
    }

    fn send(&self, event: ReloadEvent) {
        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            crate::debug!("reload"; "broadcaster stopped, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_drops_everything() {
        let reloader = Reloader::disabled();
        assert!(!reloader.is_enabled());
        reloader.notify(AssetKind::Css, &[PathBuf::from("a.css")]);
        reloader.error(AssetKind::Js, "boom");
    }

    #[test]
    fn test_assets_never_signal() {
        let (reloader, rx) = Reloader::channel();
        reloader.notify(AssetKind::Assets, &[PathBuf::from("/dist/assets/logo.png")]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_events_in_order() {
        let (reloader, rx) = Reloader::channel();
        reloader.error(AssetKind::Css, "bad");
        reloader.notify(AssetKind::Css, &[PathBuf::from("/dist/app.css")]);
        reloader.clear_error(AssetKind::Css);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            [
                ReloadEvent::Failed {
                    kind: AssetKind::Css,
                    message: "bad".into()
                },
                ReloadEvent::Changed {
                    kind: AssetKind::Css,
                    paths: vec![PathBuf::from("/dist/app.css")]
                },
                ReloadEvent::Recovered(AssetKind::Css),
            ]
        );
    }
}
