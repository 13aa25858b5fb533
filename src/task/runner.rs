//! Level-by-level task execution.
//!
//! | mode               | build failure                                     |
//! |--------------------|---------------------------------------------------|
//! | one-shot           | logged; the run fails once its level completes    |
//! | `default` (watch)  | isolated: status block, bell, browser overlay     |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::task::JoinSet;

use super::graph::{Action, TaskGraph, TaskId};
use crate::config::KilnConfig;
use crate::core::{AssetKind, register_server, wait_for_shutdown};
use crate::pipeline::{BuildContext, BuildError, BuildReport, run_build};
use crate::reload::{ReloadServer, Reloader};
use crate::serve::{PreviewServer, Site, open_browser};
use crate::watch::{FileWatcher, report_isolated};
use crate::{debug, log};

/// Run the task named `target` with its dependencies.
pub async fn run(config: &KilnConfig, target: &str) -> Result<()> {
    let graph = TaskGraph::standard();
    let target = graph
        .find(target)
        .ok_or_else(|| anyhow!("unknown task `{target}`"))?;
    let plan = graph.plan(target);

    let has = |action: Action| {
        plan.iter()
            .flatten()
            .any(|id| graph.task(*id).action == action)
    };
    let serving = has(Action::Serve);
    let watching = has(Action::Watch);

    let serve_root = serve_root(config);
    let (reloader, reload_port) = if serving {
        let server = ReloadServer::bind(config.serve.interface, config.serve.reload_port)?;
        let port = server.port();
        (server.start(serve_root.clone())?, Some(port))
    } else {
        (Reloader::disabled(), None)
    };

    let ctx = Arc::new(BuildContext::new(config, reloader)?);
    let runner = Runner {
        graph: &graph,
        config,
        ctx,
        site: Site {
            root: serve_root,
            reload_port,
        },
        isolate: watching,
    };

    for level in &plan {
        runner.run_level(level).await?;
    }

    if serving && !watching {
        log!("serve"; "press Ctrl+C to stop");
        wait_for_shutdown().await;
    }
    Ok(())
}

struct Runner<'a> {
    graph: &'a TaskGraph,
    config: &'a KilnConfig,
    ctx: Arc<BuildContext>,
    site: Site,
    /// Report build failures instead of failing the run.
    isolate: bool,
}

impl Runner<'_> {
    /// Start every task of the level, then wait for all builds.
    async fn run_level(&self, level: &[TaskId]) -> Result<()> {
        let mut builds = JoinSet::new();
        let mut watch = false;

        for id in level {
            let task = self.graph.task(*id);
            debug!("task"; "starting {}", task.name);
            match task.action {
                Action::Build(kind) => {
                    let ctx = Arc::clone(&self.ctx);
                    builds.spawn(async move { (kind, run_build(kind, ctx).await) });
                }
                Action::Group => {}
                Action::Serve => self.serve()?,
                Action::Watch => watch = true,
            }
        }

        let mut failed = None;
        while let Some(joined) = builds.join_next().await {
            let (kind, result) = joined.context("build task panicked")?;
            if let Err(err) = self.finish_build(kind, result) {
                failed.get_or_insert(err);
            }
        }
        if let Some(err) = failed {
            return Err(err);
        }

        if watch {
            FileWatcher::new(Arc::clone(&self.ctx))?.run().await;
        }
        Ok(())
    }

    fn finish_build(&self, kind: AssetKind, result: Result<BuildReport, BuildError>) -> Result<()> {
        if self.isolate {
            report_isolated(kind, result, &self.ctx.reloader);
            return Ok(());
        }
        match result {
            Ok(report) => {
                log!(kind.name(); "{}", report.summary());
                Ok(())
            }
            Err(err) => {
                log!("error"; "{}: {}", kind.task_name(), err);
                Err(anyhow::Error::new(err).context(format!("{} failed", kind.task_name())))
            }
        }
    }

    /// Bind the preview server, start its request loop and open a browser.
    fn serve(&self) -> Result<()> {
        let serve = &self.config.serve;
        let server = PreviewServer::bind(serve.interface, serve.port)?;
        register_server(server.handle());

        let url = server.url();
        server.start(self.site.clone())?;
        log!("serve"; "{} (serving {})", url, self.site.root.display());

        if serve.open
            && let Err(e) = open_browser(&url)
        {
            log!("serve"; "{:#}", e);
        }
        Ok(())
    }
}

fn serve_root(config: &KilnConfig) -> PathBuf {
    let root = &config.serve.root;
    config.root_join(root.strip_prefix("./").unwrap_or(root))
}
