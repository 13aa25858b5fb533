//! Configuration section definitions.

mod build;
mod css;
mod js;
mod paths;
mod serve;

pub use build::BuildConfig;
pub use css::{BrowserTargets, CssConfig, PLACEHOLDER, Replacement};
pub use js::JsConfig;
pub use paths::{
    DEFAULT_MODULES, FileRules, FileRulesPatch, MODULES_KEY, PathsConfig, default_dist,
    default_file_rules, default_src,
};
pub use serve::ServeConfig;
