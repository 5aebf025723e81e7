//! View rendering with `beforeRender` / `afterRender` hooks

use serde_json::Value;
use tracing::debug;

use super::hooks::ViewEvent;
use super::Controller;
use crate::error::DispatchError;
use crate::view::{render_layout, ViewContext, ViewRenderer};

impl Controller {
    /// Render a view and wrap it in the controller layout
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::View`] when no renderer is configured or
    /// rendering fails, and [`DispatchError::Hook`] when an observer fails.
    pub fn render(&self, view: &str, params: Value) -> Result<String, DispatchError> {
        let Some(content) = self.render_view(view, params.clone())? else {
            return Ok(String::new());
        };
        match (&self.layout, self.renderer()) {
            (Some(layout), Ok(renderer)) => {
                render_layout(renderer, layout, content, &params).map_err(DispatchError::View)
            }
            _ => Ok(content),
        }
    }

    /// Render a view without the layout
    ///
    /// View names starting with `/` are looked up from the view root; other
    /// names are looked up under the controller's unique id. A cancelled
    /// `beforeRender` yields an empty string without touching the renderer.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn render_partial(&self, view: &str, params: Value) -> Result<String, DispatchError> {
        Ok(self.render_view(view, params)?.unwrap_or_default())
    }

    /// `None` when `beforeRender` cancelled
    fn render_view(&self, view: &str, params: Value) -> Result<Option<String>, DispatchError> {
        let renderer = self.renderer()?;
        let mut event = ViewEvent::new(self.view_name(view), params);

        if !self
            .hooks
            .before_render
            .allows(&mut event)
            .map_err(DispatchError::Hook)?
        {
            debug!(view = %event.view, "Rendering cancelled");
            return Ok(None);
        }

        let context = ViewContext::Controller { route: self.route() };
        let output = renderer
            .render(&event.view, &event.params, &context)
            .map_err(DispatchError::View)?;

        event.output = Some(output);
        self.hooks
            .after_render
            .trigger(&mut event)
            .map_err(DispatchError::Hook)?;

        Ok(Some(event.output.unwrap_or_default()))
    }

    fn renderer(&self) -> Result<&dyn ViewRenderer, DispatchError> {
        self.view
            .as_deref()
            .ok_or_else(|| DispatchError::View(anyhow::anyhow!("no view renderer configured")))
    }

    fn view_name(&self, view: &str) -> String {
        view.strip_prefix('/').map_or_else(
            || format!("{}/{view}", self.unique_id()),
            ToString::to_string,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ModuleNode;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    /// Renders `view|param-json`, and `layout[content]` for layouts
    #[derive(Default)]
    struct EchoRenderer {
        calls: Mutex<Vec<String>>,
    }

    impl ViewRenderer for EchoRenderer {
        fn render(
            &self,
            view: &str,
            params: &Value,
            context: &ViewContext,
        ) -> anyhow::Result<String> {
            self.calls.lock().push(view.to_string());
            if *context == ViewContext::Layout {
                let content = params["content"].as_str().unwrap_or_default();
                return Ok(format!("{view}[{content}]"));
            }
            Ok(format!("{view}|{}", params["name"].as_str().unwrap_or_default()))
        }
    }

    #[test]
    fn test_view_is_resolved_under_unique_id() {
        let admin = ModuleNode::root("admin");
        let renderer = Arc::new(EchoRenderer::default());
        let controller = Controller::builder("site")
            .parent(&admin)
            .view_renderer(renderer.clone())
            .build()
            .unwrap();

        let out = controller.render("index", json!({"name": "Ann"})).unwrap();
        assert_eq!(out, "admin/site/index|Ann");

        let out = controller.render("/shared/menu", json!({})).unwrap();
        assert_eq!(out, "shared/menu|");
    }

    #[test]
    fn test_layout_wraps_render_but_not_partial() {
        let controller = Controller::builder("site")
            .layout("layouts/main")
            .view_renderer(Arc::new(EchoRenderer::default()))
            .build()
            .unwrap();

        assert_eq!(
            controller.render("index", json!({"name": "Ann"})).unwrap(),
            "layouts/main[site/index|Ann]"
        );
        assert_eq!(
            controller.render_partial("index", json!({"name": "Ann"})).unwrap(),
            "site/index|Ann"
        );
    }

    #[test]
    fn test_before_render_cancel_skips_renderer() {
        let renderer = Arc::new(EchoRenderer::default());
        let controller = Controller::builder("site")
            .view_renderer(renderer.clone())
            .on_before_render(|event| {
                event.is_valid = false;
                Ok(())
            })
            .build()
            .unwrap();

        assert_eq!(controller.render_partial("index", json!({})).unwrap(), "");
        assert!(renderer.calls.lock().is_empty());
    }

    #[test]
    fn test_before_render_cancel_skips_layout() {
        let renderer = Arc::new(EchoRenderer::default());
        let controller = Controller::builder("site")
            .layout("layouts/main")
            .view_renderer(renderer.clone())
            .on_before_render(|event| {
                event.is_valid = false;
                Ok(())
            })
            .build()
            .unwrap();

        assert_eq!(controller.render("index", json!({"name": "Ann"})).unwrap(), "");
        assert!(renderer.calls.lock().is_empty());
    }

    #[test]
    fn test_after_render_rewrites_output() {
        let controller = Controller::builder("site")
            .view_renderer(Arc::new(EchoRenderer::default()))
            .on_after_render(|event| {
                event.output = event.output.take().map(|o| o.to_uppercase());
                Ok(())
            })
            .build()
            .unwrap();

        assert_eq!(
            controller.render_partial("index", json!({"name": "ann"})).unwrap(),
            "SITE/INDEX|ANN"
        );
    }

    #[test]
    fn test_render_without_renderer_fails() {
        let controller = Controller::builder("site").build().unwrap();
        let err = controller.render("index", json!({})).unwrap_err();
        assert!(matches!(err, DispatchError::View(_)));
    }
}
