//! Actions and their results

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::params::{bind, BoundArgs, InvalidParams, ParamSpec, Params};
use super::Controller;

/// Process-style exit status of a dispatched action
///
/// `0` is normal completion, anything else is abnormal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(i32);

impl ExitStatus {
    /// Normal completion
    pub const OK: Self = Self(0);

    /// Abnormal completion; used by the dispatcher for every short-circuit
    pub const ERROR: Self = Self(1);

    /// Numeric value
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether the status is `0`
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value returned by an action body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActionOutput {
    /// Nothing to report
    #[default]
    Empty,
    /// Explicit exit status
    Status(i32),
    /// Rendered content
    Content(String),
    /// Structured data
    Data(Value),
}

impl ActionOutput {
    /// Coerce the output to an exit status
    ///
    /// Only [`ActionOutput::Status`] carries a status of its own; every other
    /// output counts as success.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Status(code) => ExitStatus(*code),
            Self::Empty | Self::Content(_) | Self::Data(_) => ExitStatus::OK,
        }
    }
}

impl From<()> for ActionOutput {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<i32> for ActionOutput {
    fn from(code: i32) -> Self {
        Self::Status(code)
    }
}

impl From<ExitStatus> for ActionOutput {
    fn from(status: ExitStatus) -> Self {
        Self::Status(status.code())
    }
}

impl From<String> for ActionOutput {
    fn from(content: String) -> Self {
        Self::Content(content)
    }
}

impl From<&str> for ActionOutput {
    fn from(content: &str) -> Self {
        Self::Content(content.to_string())
    }
}

impl From<Value> for ActionOutput {
    fn from(data: Value) -> Self {
        Self::Data(data)
    }
}

/// A unit of request-handling logic
///
/// Actions are created per dispatch, either by wrapping an inline handler
/// registered on the controller or by calling a factory from the
/// controller's action map. The owning controller is passed to [`run`]
/// instead of being stored in the action.
///
/// [`run`]: Action::run
pub trait Action: Send + Sync {
    /// Action id, unique within its controller
    fn id(&self) -> &str;

    /// Parameters the action accepts
    fn params(&self) -> &[ParamSpec] {
        &[]
    }

    /// Bind request parameters to this action's arguments
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParams`] when the request cannot be served with the
    /// given parameters.
    fn bind_params(&self, params: &Params) -> Result<BoundArgs, InvalidParams> {
        bind(self.params(), params)
    }

    /// Execute the action
    fn run(&self, controller: &Controller, args: &BoundArgs) -> anyhow::Result<ActionOutput>;
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("id", &self.id()).finish()
    }
}

/// Handler closure behind an inline action
pub type InlineHandler =
    Arc<dyn Fn(&Controller, &BoundArgs) -> anyhow::Result<ActionOutput> + Send + Sync>;

/// Action backed by a handler registered directly on the controller
#[derive(Clone)]
pub struct InlineAction {
    id: String,
    params: Vec<ParamSpec>,
    handler: InlineHandler,
}

impl InlineAction {
    /// Wrap a handler
    pub fn new(id: impl Into<String>, params: Vec<ParamSpec>, handler: InlineHandler) -> Self {
        Self {
            id: id.into(),
            params,
            handler,
        }
    }
}

impl Action for InlineAction {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn run(&self, controller: &Controller, args: &BoundArgs) -> anyhow::Result<ActionOutput> {
        (self.handler)(controller, args)
    }
}

impl fmt::Debug for InlineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineAction")
            .field("id", &self.id)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// What [`Controller::run`] should execute
#[derive(Clone)]
pub enum ActionTarget {
    /// Resolve an action by id; an empty id selects the default action
    Id(String),
    /// Run an action that was already built
    Action(Arc<dyn Action>),
}

impl From<&str> for ActionTarget {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ActionTarget {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Arc<dyn Action>> for ActionTarget {
    fn from(action: Arc<dyn Action>) -> Self {
        Self::Action(action)
    }
}

impl fmt::Debug for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Action(action) => f.debug_tuple("Action").field(&action.id()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_status_output_carries_a_code() {
        assert_eq!(ActionOutput::Status(3).exit_status(), ExitStatus::from(3));
        assert_eq!(ActionOutput::Empty.exit_status(), ExitStatus::OK);
        assert_eq!(ActionOutput::from("page").exit_status(), ExitStatus::OK);
        assert_eq!(ActionOutput::from(json!({"a": 1})).exit_status(), ExitStatus::OK);
    }

    #[test]
    fn test_exit_status_helpers() {
        assert!(ExitStatus::OK.is_success());
        assert!(!ExitStatus::ERROR.is_success());
        assert_eq!(ExitStatus::ERROR.code(), 1);
        assert_eq!(ExitStatus::from(42).to_string(), "42");
    }

    #[test]
    fn test_target_from_str() {
        assert!(matches!(ActionTarget::from("view"), ActionTarget::Id(id) if id == "view"));
    }
}
