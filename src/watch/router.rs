//! Change routing: which kinds does a changed path re-trigger.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::core::{AssetKind, PerKind};
use crate::paths::{PathResolver, PatternSet};

/// Per-kind watch patterns, matched against root-relative paths.
pub(super) struct Router {
    root: PathBuf,
    watch: PerKind<PatternSet>,
}

impl Router {
    pub(super) fn new(root: &Path, resolver: &PathResolver) -> Result<Self, ConfigError> {
        let mut watch = PerKind::<PatternSet>::default();
        for kind in AssetKind::ALL {
            *watch.get_mut(kind) = PatternSet::new(&resolver.resolve(kind).watch)?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            watch,
        })
    }

    /// Kinds whose watch list matches any of `paths`, each once, in
    /// registration order.
    pub(super) fn route(&self, paths: &[PathBuf]) -> Vec<AssetKind> {
        let relative: Vec<&Path> = paths
            .iter()
            .filter_map(|p| p.strip_prefix(&self.root).ok())
            .collect();

        self.watch
            .iter()
            .filter(|(_, set)| relative.iter().any(|rel| set.is_match(rel)))
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Absolute directories to watch: the glob bases of every watch list.
    pub(super) fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for (_, set) in self.watch.iter() {
            for base in set.bases() {
                let dir = self.root.join(base);
                if !roots.contains(&dir) {
                    roots.push(dir);
                }
            }
        }
        roots
    }
}
