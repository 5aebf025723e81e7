//! Controller lifecycle events

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::action::{Action, ActionOutput};
use crate::events::{Cancellable, Hook};

/// Payload of the `authorize`, `beforeAction` and `afterAction` hooks
pub struct ActionEvent {
    /// Action being dispatched
    pub action: Arc<dyn Action>,
    /// Clear to stop the dispatch (ignored by `afterAction`)
    pub is_valid: bool,
    /// Action output; only set for `afterAction`, where observers may replace it
    pub result: Option<ActionOutput>,
}

impl ActionEvent {
    /// Event for `action` with no result yet
    #[must_use]
    pub fn new(action: Arc<dyn Action>) -> Self {
        Self {
            action,
            is_valid: true,
            result: None,
        }
    }

    /// Event carrying the action's output
    #[must_use]
    pub fn with_result(action: Arc<dyn Action>, result: ActionOutput) -> Self {
        Self {
            action,
            is_valid: true,
            result: Some(result),
        }
    }

    /// Id of the action being dispatched
    #[must_use]
    pub fn action_id(&self) -> &str {
        self.action.id()
    }
}

impl Cancellable for ActionEvent {
    fn is_valid(&self) -> bool {
        self.is_valid
    }

    fn cancel(&mut self) {
        self.is_valid = false;
    }
}

impl fmt::Debug for ActionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEvent")
            .field("action", &self.action.id())
            .field("is_valid", &self.is_valid)
            .field("result", &self.result)
            .finish()
    }
}

/// Payload of the `beforeRender` and `afterRender` hooks
#[derive(Debug, Clone)]
pub struct ViewEvent {
    /// Resolved view name
    pub view: String,
    /// Parameters passed to the view
    pub params: Value,
    /// Clear in `beforeRender` to skip rendering
    pub is_valid: bool,
    /// Rendered output; only set for `afterRender`, where observers may rewrite it
    pub output: Option<String>,
}

impl ViewEvent {
    pub(crate) const fn new(view: String, params: Value) -> Self {
        Self {
            view,
            params,
            is_valid: true,
            output: None,
        }
    }
}

impl Cancellable for ViewEvent {
    fn is_valid(&self) -> bool {
        self.is_valid
    }

    fn cancel(&mut self) {
        self.is_valid = false;
    }
}

/// Hooks attached to a controller
#[derive(Debug, Clone)]
pub struct ControllerHooks {
    /// Gate run before parameters are bound
    pub authorize: Hook<ActionEvent>,
    /// Gate run right before the action body
    pub before_action: Hook<ActionEvent>,
    /// Notification after the action body succeeded
    pub after_action: Hook<ActionEvent>,
    /// Gate run before a view is rendered
    pub before_render: Hook<ViewEvent>,
    /// Notification after a view was rendered
    pub after_render: Hook<ViewEvent>,
}

impl Default for ControllerHooks {
    fn default() -> Self {
        Self {
            authorize: Hook::new("authorize"),
            before_action: Hook::new("beforeAction"),
            after_action: Hook::new("afterAction"),
            before_render: Hook::new("beforeRender"),
            after_render: Hook::new("afterRender"),
        }
    }
}
