//! View rendering
//!
//! Controllers and the mailer render through the [`ViewRenderer`] trait so
//! applications can plug in any template engine. [`MiniJinjaRenderer`] is the
//! bundled implementation.

mod jinja;

pub use jinja::MiniJinjaRenderer;

use serde_json::Value;

/// Who is asking for a view to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContext {
    /// A controller, identified by its route at render time
    Controller {
        /// Controller route (`unique_id` plus current action, if any)
        route: String,
    },
    /// The mailer composing a message
    Mailer,
    /// A layout wrapping previously rendered content
    Layout,
}

/// Template rendering service
pub trait ViewRenderer: Send + Sync {
    /// Render `view` with `params`
    ///
    /// # Errors
    ///
    /// Returns an error when the view cannot be found or fails to render.
    fn render(&self, view: &str, params: &Value, context: &ViewContext) -> anyhow::Result<String>;
}

/// Wrap rendered `content` in `layout`
///
/// The layout receives the content in the `content` variable, next to the
/// original view parameters.
///
/// # Errors
///
/// Propagates the renderer's error.
pub fn render_layout(
    renderer: &dyn ViewRenderer,
    layout: &str,
    content: String,
    params: &Value,
) -> anyhow::Result<String> {
    let mut layout_params = match params {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    layout_params.insert("content".to_string(), Value::String(content));
    renderer.render(layout, &Value::Object(layout_params), &ViewContext::Layout)
}
