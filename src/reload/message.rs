//! Hot Reload Message Protocol
//!
//! JSON messages pushed over WebSocket to browser clients.
//!
//! # Message Types
//!
//! - `connected`: handshake acknowledgement
//! - `reload`: full page reload
//! - `css`: refresh the listed stylesheets in place
//! - `error` / `clear_error`: show or hide the build error overlay

use serde::Serialize;

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet refresh without a page reload
    Css {
        /// URL paths of the rebuilt stylesheets, e.g. `/assets/css/app.css`
        paths: Vec<String>,
    },

    /// Build error (display overlay, no reload)
    Error {
        /// Task that failed, e.g. `build:css`
        path: String,
        error: String,
    },

    /// Clear error overlay
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            error: error.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}
