//! Asset kinds: the four build domains.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One of the four build domains, each with its own roots and processor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Assets,
    Css,
    Js,
    Html,
}

impl AssetKind {
    /// All kinds, in registration order.
    pub const ALL: [Self; 4] = [Self::Assets, Self::Css, Self::Js, Self::Html];

    /// Config/identifier name (`assets`, `css`, `js`, `html`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Css => "css",
            Self::Js => "js",
            Self::Html => "html",
        }
    }

    /// Name of the per-kind build task (`build:css`, ...).
    pub const fn task_name(self) -> &'static str {
        match self {
            Self::Assets => "build:assets",
            Self::Css => "build:css",
            Self::Js => "build:js",
            Self::Html => "build:html",
        }
    }

    /// Whether a successful build signals the live-reload subsystem.
    ///
    /// Static assets are referenced by URL rewriting elsewhere, not by reload.
    pub const fn reloads(self) -> bool {
        !matches!(self, Self::Assets)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assets" => Ok(Self::Assets),
            "css" => Ok(Self::Css),
            "js" => Ok(Self::Js),
            "html" => Ok(Self::Html),
            other => Err(ConfigError::UnknownAssetKind(other.to_string())),
        }
    }
}

/// A value for each asset kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerKind<T> {
    pub assets: T,
    pub css: T,
    pub js: T,
    pub html: T,
}

impl<T> PerKind<T> {
    pub fn from_fn(mut f: impl FnMut(AssetKind) -> T) -> Self {
        Self {
            assets: f(AssetKind::Assets),
            css: f(AssetKind::Css),
            js: f(AssetKind::Js),
            html: f(AssetKind::Html),
        }
    }

    pub const fn get(&self, kind: AssetKind) -> &T {
        match kind {
            AssetKind::Assets => &self.assets,
            AssetKind::Css => &self.css,
            AssetKind::Js => &self.js,
            AssetKind::Html => &self.html,
        }
    }

    pub fn get_mut(&mut self, kind: AssetKind) -> &mut T {
        match kind {
            AssetKind::Assets => &mut self.assets,
            AssetKind::Css => &mut self.css,
            AssetKind::Js => &mut self.js,
            AssetKind::Html => &mut self.html,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetKind, &T)> {
        AssetKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
