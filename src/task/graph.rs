//! Named tasks and their dependency levels.
//!
//! Tasks are addressed by [`TaskId`] handles handed out by [`TaskGraph::add`].
//! A task can only depend on handles that already exist, so the graph is
//! acyclic by construction.

use crate::core::AssetKind;

/// Handle to a task registered in a [`TaskGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

/// What running a task does once its dependencies have completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// One per-kind pipeline invocation.
    Build(AssetKind),
    /// Nothing beyond its dependencies.
    Group,
    /// Start the preview server.
    Serve,
    /// Rebuild on change until shutdown.
    Watch,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub name: &'static str,
    pub action: Action,
    pub deps: Vec<TaskId>,
}

/// Every task name of [`TaskGraph::standard`], in registration order.
pub const TASK_NAMES: [&str; 7] = [
    "build:assets",
    "build:css",
    "build:js",
    "build:html",
    "build",
    "serve",
    "default",
];

#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The task set of the command line.
    ///
    /// ```text
    /// build:assets ─┐
    /// build:css ────┤
    /// build:js ─────┼─▶ build ─┐
    /// build:html ───┘          ├─▶ default (watch)
    /// serve ───────────────────┘
    /// ```
    pub fn standard() -> Self {
        let mut graph = Self::new();
        let builds: Vec<TaskId> = AssetKind::ALL
            .into_iter()
            .map(|kind| graph.add(kind.task_name(), Action::Build(kind), &[]))
            .collect();
        let build = graph.add("build", Action::Group, &builds);
        let serve = graph.add("serve", Action::Serve, &[]);
        graph.add("default", Action::Watch, &[build, serve]);
        graph
    }

    /// Register a task after its dependencies.
    pub fn add(&mut self, name: &'static str, action: Action, deps: &[TaskId]) -> TaskId {
        let id = TaskId(self.tasks.len());
        debug_assert!(deps.iter().all(|dep| dep.0 < id.0));
        self.tasks.push(Task {
            name,
            action,
            deps: deps.to_vec(),
        });
        id
    }

    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks.iter().position(|t| t.name == name).map(TaskId)
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    /// `target` and its transitive dependencies grouped into levels.
    ///
    /// A task sits one level above its deepest dependency, so tasks that
    /// share a level never depend on each other. Every task appears once;
    /// `target` is alone in the last level.
    pub fn plan(&self, target: TaskId) -> Vec<Vec<TaskId>> {
        let mut depth: Vec<Option<usize>> = vec![None; self.tasks.len()];
        self.depth_of(target, &mut depth);

        let Some(last) = depth[target.0] else {
            return Vec::new();
        };
        let mut levels = vec![Vec::new(); last + 1];
        for (index, level) in depth.iter().enumerate() {
            if let Some(level) = level {
                levels[*level].push(TaskId(index));
            }
        }
        levels
    }

    fn depth_of(&self, id: TaskId, depth: &mut [Option<usize>]) -> usize {
        if let Some(known) = depth[id.0] {
            return known;
        }
        let level = self.tasks[id.0]
            .deps
            .iter()
            .map(|dep| self.depth_of(*dep, depth) + 1)
            .max()
            .unwrap_or(0);
        depth[id.0] = Some(level);
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(graph: &TaskGraph, levels: &[Vec<TaskId>]) -> Vec<Vec<&'static str>> {
        levels
            .iter()
            .map(|level| level.iter().map(|id| graph.task(*id).name).collect())
            .collect()
    }

    #[test]
    fn test_standard_names() {
        let graph = TaskGraph::standard();
        for name in TASK_NAMES {
            assert!(graph.find(name).is_some(), "missing {name}");
        }
        assert!(graph.find("watch").is_none());
    }

    #[test]
    fn test_single_build_plan() {
        let graph = TaskGraph::standard();
        let css = graph.find("build:css").unwrap();
        assert_eq!(graph.task(css).action, Action::Build(AssetKind::Css));
        assert_eq!(graph.plan(css), [vec![css]]);
    }

    #[test]
    fn test_build_plan_levels() {
        let graph = TaskGraph::standard();
        let plan = graph.plan(graph.find("build").unwrap());
        assert_eq!(
            names(&graph, &plan),
            [
                vec!["build:assets", "build:css", "build:js", "build:html"],
                vec!["build"],
            ]
        );
    }

    #[test]
    fn test_default_plan() {
        let graph = TaskGraph::standard();
        let plan = graph.plan(graph.find("default").unwrap());
        assert_eq!(
            names(&graph, &plan),
            [
                vec!["build:assets", "build:css", "build:js", "build:html", "serve"],
                vec!["build"],
                vec!["default"],
            ]
        );
    }

    #[test]
    fn test_shared_dependency_planned_once() {
        let mut graph = TaskGraph::new();
        let base = graph.add("base", Action::Group, &[]);
        let left = graph.add("left", Action::Group, &[base]);
        let right = graph.add("right", Action::Group, &[base]);
        let top = graph.add("top", Action::Group, &[left, right, base]);

        let plan = graph.plan(top);
        assert_eq!(plan, [vec![base], vec![left, right], vec![top]]);
    }

    #[test]
    fn test_unrelated_tasks_excluded() {
        let graph = TaskGraph::standard();
        let plan = graph.plan(graph.find("serve").unwrap());
        assert_eq!(names(&graph, &plan), [vec!["serve"]]);
    }
}
