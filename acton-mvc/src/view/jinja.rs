//! MiniJinja-backed view renderer

use std::path::{Path, PathBuf};

use minijinja::Environment;
use parking_lot::RwLock;
use serde_json::Value;

use super::{ViewContext, ViewRenderer};
use crate::config::ViewSettings;

/// Renders views from a template directory with MiniJinja
///
/// A view named `site/index` is loaded from `<view_dir>/site/index.<ext>`.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_mvc::view::{MiniJinjaRenderer, ViewContext, ViewRenderer};
///
/// # fn example() -> anyhow::Result<()> {
/// let renderer = MiniJinjaRenderer::new("./views", "html");
/// let html = renderer.render(
///     "site/index",
///     &serde_json::json!({ "name": "Alice" }),
///     &ViewContext::Mailer,
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MiniJinjaRenderer {
    env: RwLock<Environment<'static>>,
    view_dir: PathBuf,
    extension: String,
}

impl MiniJinjaRenderer {
    /// Create a renderer over `view_dir`
    pub fn new(view_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let view_dir = view_dir.into();
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(&view_dir));
        Self {
            env: RwLock::new(env),
            view_dir,
            extension: extension.into(),
        }
    }

    /// Create a renderer from the `[views]` configuration section
    #[must_use]
    pub fn from_settings(settings: &ViewSettings) -> Self {
        Self::new(settings.view_dir.clone(), settings.extension.clone())
    }

    /// Directory views are loaded from
    #[must_use]
    pub fn view_dir(&self) -> &Path {
        &self.view_dir
    }

    /// Drop cached templates so edits on disk are picked up
    pub fn reload(&self) {
        self.env.write().clear_templates();
    }

    fn template_name(&self, view: &str) -> String {
        let view = view.trim_start_matches('/');
        if Path::new(view).extension().is_some() {
            view.to_string()
        } else {
            format!("{view}.{}", self.extension)
        }
    }
}

impl ViewRenderer for MiniJinjaRenderer {
    fn render(&self, view: &str, params: &Value, context: &ViewContext) -> anyhow::Result<String> {
        let name = self.template_name(view);
        tracing::debug!(view = %name, ?context, "Rendering view");
        let env = self.env.read();
        let template = env.get_template(&name)?;
        Ok(template.render(params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer_with(files: &[(&str, &str)]) -> (tempfile::TempDir, MiniJinjaRenderer) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        let renderer = MiniJinjaRenderer::new(dir.path(), "html");
        (dir, renderer)
    }

    #[test]
    fn test_renders_view_with_params() {
        let (_dir, renderer) = renderer_with(&[("site/index.html", "Hello, {{ name }}!")]);
        let out = renderer
            .render("site/index", &json!({"name": "Alice"}), &ViewContext::Mailer)
            .unwrap();
        assert_eq!(out, "Hello, Alice!");
    }

    #[test]
    fn test_explicit_extension_is_kept() {
        let (_dir, renderer) = renderer_with(&[("mail/welcome.txt", "Welcome {{ name }}")]);
        let out = renderer
            .render("/mail/welcome.txt", &json!({"name": "Bob"}), &ViewContext::Mailer)
            .unwrap();
        assert_eq!(out, "Welcome Bob");
    }

    #[test]
    fn test_missing_view_is_an_error() {
        let (_dir, renderer) = renderer_with(&[]);
        assert!(renderer
            .render("nope", &json!({}), &ViewContext::Mailer)
            .is_err());
    }
}
