//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Preview server resources (livereload.js)
//!
//! ```ignore
//! use embed::serve::{LIVERELOAD_JS, LivereloadVars};
//!
//! let js = LIVERELOAD_JS.render(&LivereloadVars { reload_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the live-reload client is served from.
    pub const LIVERELOAD_PATH: &str = "/__kiln/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub reload_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__KILN_RELOAD_PORT__", &self.reload_port.to_string())
        }
    }

    /// Live-reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// `<script>` tag loading the client.
    pub fn script_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_PATH}"></script>"#)
    }
}
