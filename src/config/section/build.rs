//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! timeout = 60    # seconds per processor stage, 0 disables
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pipeline-wide build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Per-stage timeout in seconds. `0` waits indefinitely.
    pub timeout: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { timeout: 60 }
    }
}

impl BuildConfig {
    pub fn stage_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_timeout_default() {
        let config = test_parse_config("");
        assert_eq!(config.build.stage_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_timeout_disabled() {
        let config = test_parse_config("[build]\ntimeout = 0");
        assert_eq!(config.build.stage_timeout(), None);
    }
}
