//! Watch mode.
//!
//! ```text
//! notify ─▶ Debouncer (300ms) ─▶ Router (watch patterns) ─▶ RebuildSlot ─▶ run_build
//! ```
//!
//! Each debounced batch is routed to every kind whose watch list matches
//! one of its paths. A kind that is already building is marked dirty and
//! rebuilt once more when the running build completes.

mod debouncer;
mod roots;
mod router;
mod slot;


use slot::RebuildSlot;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::RecommendedWatcher;

use crate::core::{AssetKind, PerKind};
use crate::logger::{alert, status_error, status_success};
use crate::pipeline::{BuildContext, BuildError, BuildReport, run_build};
use crate::reload::Reloader;
use crate::utils::path::display_relative;
use debouncer::Debouncer;
use roots::WatchRoots;
use router::Router;

/// File watcher driving per-kind rebuilds.
pub struct FileWatcher {
    /// Receives notify events (sync side)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow
    watcher: RecommendedWatcher,
    roots: WatchRoots,
    router: Router,
    ctx: Arc<BuildContext>,
    slots: Arc<PerKind<RebuildSlot>>,
}

impl FileWatcher {
    /// Attach the watcher to every existing watch directory.
    pub fn new(ctx: Arc<BuildContext>) -> Result<Self> {
        let router = Router::new(&ctx.root, &ctx.resolver)?;

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;

        let mut roots = WatchRoots::new(router.roots());
        roots
            .attach_existing(&mut watcher)
            .context("failed to watch source directories")?;
        crate::debug!("watch"; "watching {} directories", roots.attached());

        Ok(Self {
            notify_rx,
            watcher,
            roots,
            router,
            ctx,
            slots: Arc::new(PerKind::default()),
        })
    }

    /// Route changes until shutdown is requested.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut roots,
            router,
            ctx,
            slots,
        } = self;
        let mut debouncer = Debouncer::new();

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // notify only offers a sync channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        crate::log!("watch"; "watching for changes, press Ctrl+C to stop");

        let shutdown = crate::core::wait_for_shutdown();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    roots.maintain(&mut watcher);
                    if let Some(paths) = debouncer.take_if_ready() {
                        dispatch(&paths, &router, &ctx, &slots);
                    }
                }
            }
        }
    }
}

/// Start (or coalesce) a rebuild for every kind the batch touches.
fn dispatch(
    paths: &[PathBuf],
    router: &Router,
    ctx: &Arc<BuildContext>,
    slots: &Arc<PerKind<RebuildSlot>>,
) {
    let kinds = router.route(paths);
    if kinds.is_empty() {
        crate::debug!("watch"; "{} changes matched no watch pattern", paths.len());
        return;
    }

    match paths {
        [path] => crate::log!("watch"; "changed: {}", display_relative(path, &ctx.root)),
        _ => crate::log!("watch"; "{} files changed", paths.len()),
    }

    for kind in kinds {
        if slots.get(kind).request() {
            tokio::spawn(rebuild(kind, Arc::clone(ctx), Arc::clone(slots)));
        } else {
            crate::debug!("watch"; "{} busy, queued one more run", kind.task_name());
        }
    }
}

/// Build `kind` until no change arrived during the last run.
async fn rebuild(kind: AssetKind, ctx: Arc<BuildContext>, slots: Arc<PerKind<RebuildSlot>>) {
    loop {
        let result = run_build(kind, Arc::clone(&ctx)).await;
        report_isolated(kind, result, &ctx.reloader);
        if !slots.get(kind).finish() {
            break;
        }
    }
}

/// Report a build outcome without failing the process.
///
/// Failures print a status block, ring the bell and push an overlay to
/// browsers; success clears that kind's overlay. Returns whether the build
/// succeeded.
pub fn report_isolated(
    kind: AssetKind,
    result: Result<BuildReport, BuildError>,
    reloader: &Reloader,
) -> bool {
    match result {
        Ok(report) => {
            status_success(&report.summary());
            reloader.clear_error(kind);
            true
        }
        Err(err) => {
            let message = err.to_string();
            crate::log!("error"; "{}: {}", kind.task_name(), message);
            status_error(&format!("{} failed", kind.task_name()), &message);
            alert();
            reloader.error(kind, message);
            false
        }
    }
}
