//! Translation of pipeline events into client messages.

use std::path::{Path, PathBuf};

use super::{HotReloadMessage, ReloadEvent};
use crate::core::{AssetKind, PerKind};

/// Broadcaster state: the serve root for URL mapping and the latest error
/// per kind, replayed to clients that connect while it is unresolved.
#[derive(Debug)]
pub struct Relay {
    serve_root: PathBuf,
    pending: PerKind<Option<String>>,
}

impl Relay {
    pub fn new(serve_root: PathBuf) -> Self {
        Self {
            serve_root,
            pending: PerKind::default(),
        }
    }

    /// Messages to broadcast for one event, in send order.
    pub fn handle(&mut self, event: ReloadEvent) -> Vec<HotReloadMessage> {
        match event {
            ReloadEvent::Changed { kind, paths } => {
                let mut out = self.resolve(kind);
                out.push(self.change_message(kind, &paths));
                out
            }
            ReloadEvent::Failed { kind, message } => {
                let msg = HotReloadMessage::error(kind.task_name(), message.as_str());
                *self.pending.get_mut(kind) = Some(message);
                vec![msg]
            }
            ReloadEvent::Recovered(kind) => self.resolve(kind),
        }
    }

    /// Error overlay still owed to a newly connected client.
    pub fn pending(&self) -> Option<HotReloadMessage> {
        self.pending
            .iter()
            .find_map(|(kind, err)| err.as_ref().map(|e| HotReloadMessage::error(kind.task_name(), e.as_str())))
    }

    /// Drop the pending error of `kind`; the overlay falls back to another
    /// kind's error or is cleared.
    fn resolve(&mut self, kind: AssetKind) -> Vec<HotReloadMessage> {
        if self.pending.get_mut(kind).take().is_none() {
            return Vec::new();
        }
        vec![self.pending().unwrap_or(HotReloadMessage::ClearError)]
    }

    /// Stylesheets under the serve root refresh in place; anything else
    /// reloads the page.
    fn change_message(&self, kind: AssetKind, paths: &[PathBuf]) -> HotReloadMessage {
        if kind == AssetKind::Css {
            let urls: Option<Vec<String>> = paths
                .iter()
                .map(|p| url_path(p, &self.serve_root))
                .collect();
            if let Some(paths) = urls.filter(|u| !u.is_empty()) {
                return HotReloadMessage::Css { paths };
            }
        }
        HotReloadMessage::reload_with_reason(kind.task_name())
    }
}

/// `/`-rooted URL path of `path` under `root`.
fn url_path(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel.iter().map(|c| c.to_string_lossy()).collect();
    Some(format!("/{}", parts.join("/")))
}
