//! Message composition from views

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{MailError, MailMessage, Mailer};
use crate::view::{render_layout, ViewContext, ViewRenderer};

static BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("valid body pattern"));
static STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid style pattern"));
static SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid script pattern"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Views used to compose a message body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailViews {
    /// View rendered into the HTML body
    pub html: Option<String>,
    /// View rendered into the text body
    pub text: Option<String>,
}

impl MailViews {
    /// HTML view only; the text body is derived from it
    #[must_use]
    pub fn html(view: impl Into<String>) -> Self {
        Self {
            html: Some(view.into()),
            text: None,
        }
    }

    /// Text view only
    #[must_use]
    pub fn text(view: impl Into<String>) -> Self {
        Self {
            html: None,
            text: Some(view.into()),
        }
    }

    /// Add a text view
    #[must_use]
    pub fn with_text(mut self, view: impl Into<String>) -> Self {
        self.text = Some(view.into());
        self
    }
}

/// Plain text rendition of an HTML document
///
/// Keeps the `<body>` contents when present, drops `<style>` and `<script>`
/// blocks, then strips the remaining tags.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let html = BODY
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map_or(html, |body| body.as_str());
    let html = STYLE.replace_all(html, "");
    let html = SCRIPT.replace_all(&html, "");
    TAG.replace_all(&html, "").trim().to_string()
}

impl Mailer {
    /// Start a message pre-filled with the configured defaults
    ///
    /// With `views`, the HTML and/or text bodies are rendered with `params`
    /// and wrapped in the configured layouts. When only an HTML view is
    /// given, the text body is derived from the rendered HTML.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::View`] when a view is requested without a
    /// renderer or fails to render.
    pub fn compose(
        &self,
        views: Option<&MailViews>,
        params: &Value,
    ) -> Result<MailMessage, MailError> {
        let defaults = &self.settings.message;
        let mut message = MailMessage::new();
        message.from = defaults.from.clone().map(Into::into);
        message.reply_to = defaults.reply_to.clone().map(Into::into);

        let Some(views) = views else {
            return Ok(message);
        };

        if let Some(view) = &views.html {
            let html = self.render_view(view, params, self.settings.html_layout.as_deref())?;
            if views.text.is_none() {
                message.text = Some(html_to_text(&html));
            }
            message.html = Some(html);
        }
        if let Some(view) = &views.text {
            let text = self.render_view(view, params, self.settings.text_layout.as_deref())?;
            message.text = Some(text);
        }

        Ok(message)
    }

    fn render_view(
        &self,
        view: &str,
        params: &Value,
        layout: Option<&str>,
    ) -> Result<String, MailError> {
        let renderer: &dyn ViewRenderer = self
            .view
            .as_deref()
            .ok_or_else(|| MailError::View(anyhow::anyhow!("no view renderer configured")))?;

        let content = renderer
            .render(view, params, &ViewContext::Mailer)
            .map_err(MailError::View)?;
        match layout {
            Some(layout) => {
                render_layout(renderer, layout, content, params).map_err(MailError::View)
            }
            None => Ok(content),
        }
    }
}
