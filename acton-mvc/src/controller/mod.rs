//! Controllers and the action-dispatch lifecycle
//!
//! A [`Controller`] owns a table of actions and runs them through a fixed
//! lifecycle:
//!
//! 1. resolve the action id (empty ids select the default action)
//! 2. `authorize` hook
//! 3. bind request parameters
//! 4. `beforeAction` hook
//! 5. run the action body
//! 6. `afterAction` hook
//!
//! Authorization and `beforeAction` cancellations are silent and yield
//! [`ExitStatus::ERROR`]. Unknown actions and unbindable parameters go
//! through overridable failure policies that raise
//! [`DispatchError::ActionNotFound`] and [`DispatchError::InvalidParams`] by
//! default.
//!
//! # Examples
//!
//! ```rust
//! use acton_mvc::controller::{Controller, ExitStatus, ParamSpec};
//! use acton_mvc::error::DispatchError;
//!
//! # fn example() -> Result<(), DispatchError> {
//! let controller = Controller::builder("site")
//!     .inline("index", vec![], |_, _| Ok("welcome"))
//!     .inline("view", vec![ParamSpec::required("id")], |_, args| {
//!         Ok(format!("post {}", args.get("id").unwrap()))
//!     })
//!     .on_authorize(|event| {
//!         if event.action_id() == "admin" {
//!             event.is_valid = false;
//!         }
//!         Ok(())
//!     })
//!     .build()?;
//!
//! assert_eq!(controller.run("", None)?, ExitStatus::OK);
//! # Ok(())
//! # }
//! ```

mod action;
mod dispatcher;
mod forward;
mod hooks;
mod params;
mod render;
mod resolver;
mod route;

pub use action::{Action, ActionOutput, ActionTarget, ExitStatus, InlineAction, InlineHandler};
pub use dispatcher::Dispatched;
pub use forward::ApplicationDispatcher;
#[cfg(test)]
pub use forward::MockApplicationDispatcher;
pub use hooks::{ActionEvent, ControllerHooks, ViewEvent};
pub use params::{bind, BoundArgs, InvalidParams, ParamKind, ParamSpec, Params};
pub use resolver::{is_valid_action_id, Resolution, RESERVED_ACTION_ID};
pub use route::{Module, ModuleNode};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use dispatcher::ActionStacks;

use crate::config::ControllerSettings;
use crate::error::DispatchError;
use crate::view::ViewRenderer;

/// Builds a fresh action for a declared action id
///
/// Called with the requested id and the owning controller on every
/// dispatch; results are never cached.
pub type ActionFactory = Arc<dyn Fn(&str, &Controller) -> Arc<dyn Action> + Send + Sync>;

/// Failure policy for unknown action ids
///
/// Returning `Ok(())` turns the failure into a silent [`ExitStatus::ERROR`].
pub type MissingActionPolicy =
    Arc<dyn Fn(&Controller, &str) -> Result<(), DispatchError> + Send + Sync>;

/// Failure policy for parameters an action rejected
///
/// Returning `Ok(())` turns the failure into a silent [`ExitStatus::ERROR`].
pub type InvalidParamsPolicy =
    Arc<dyn Fn(&Controller, &dyn Action, InvalidParams) -> Result<(), DispatchError> + Send + Sync>;

/// Addressable request-handling unit
///
/// Built once with [`Controller::builder`]; afterwards every operation takes
/// `&self`, so actions receive the controller by shared reference and may
/// re-enter it through [`Controller::run`] or [`Controller::forward`].
///
/// The current action is tracked per thread: nested runs on one call stack
/// restore the outer action, and runs on different threads never see each
/// other's actions.
pub struct Controller {
    id: String,
    parent: Option<Weak<dyn Module>>,
    default_action: RwLock<String>,
    layout: Option<String>,
    inline_actions: HashMap<String, InlineAction>,
    action_map: HashMap<String, ActionFactory>,
    hooks: ControllerHooks,
    request_params: RwLock<Params>,
    current: ActionStacks,
    application: Option<Arc<dyn ApplicationDispatcher>>,
    view: Option<Arc<dyn ViewRenderer>>,
    missing_action: MissingActionPolicy,
    invalid_params: InvalidParamsPolicy,
}

impl Controller {
    /// Start building a controller with the given id
    #[must_use]
    pub fn builder(id: impl Into<String>) -> ControllerBuilder {
        ControllerBuilder::new(id)
    }

    /// Controller id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Containing module, if it is still alive
    #[must_use]
    pub fn parent(&self) -> Option<Arc<dyn Module>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Action id used when a request names no action
    #[must_use]
    pub fn default_action(&self) -> String {
        self.default_action.read().clone()
    }

    /// Change the default action id
    pub fn set_default_action(&self, id: impl Into<String>) {
        *self.default_action.write() = id.into();
    }

    /// Layout wrapping rendered views
    #[must_use]
    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// Snapshot of the current request parameters
    #[must_use]
    pub fn request_params(&self) -> Params {
        self.request_params.read().clone()
    }

    /// Replace the request parameters used when `run` gets none
    pub fn set_request_params(&self, params: Params) {
        *self.request_params.write() = params;
    }

    /// Action currently executing on the calling thread, if any
    #[must_use]
    pub fn current_action(&self) -> Option<Arc<dyn Action>> {
        self.current
            .lock()
            .get(&std::thread::current().id())
            .and_then(|stack| stack.last().cloned())
    }

    /// Lifecycle hooks
    #[must_use]
    pub const fn hooks(&self) -> &ControllerHooks {
        &self.hooks
    }

    /// Mutable access to the lifecycle hooks
    pub fn hooks_mut(&mut self) -> &mut ControllerHooks {
        &mut self.hooks
    }

    /// Ids of all inline and declared actions, sorted
    #[must_use]
    pub fn action_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inline_actions
            .keys()
            .chain(self.action_map.keys())
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// `parent unique id + "/" + id`, or just `id` at the top level
    #[must_use]
    pub fn unique_id(&self) -> String {
        route::qualify(self.parent.as_ref(), &self.id)
    }

    /// Unique id followed by the current action id, if an action is running
    #[must_use]
    pub fn route(&self) -> String {
        match self.current_action() {
            Some(action) => format!("{}/{}", self.unique_id(), action.id()),
            None => self.unique_id(),
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("unique_id", &self.unique_id())
            .field("default_action", &*self.default_action.read())
            .field("actions", &self.action_ids())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Controller`]
pub struct ControllerBuilder {
    id: String,
    parent: Option<Weak<dyn Module>>,
    default_action: String,
    layout: Option<String>,
    inline_actions: HashMap<String, InlineAction>,
    action_map: HashMap<String, ActionFactory>,
    hooks: ControllerHooks,
    request_params: Params,
    application: Option<Arc<dyn ApplicationDispatcher>>,
    view: Option<Arc<dyn ViewRenderer>>,
    missing_action: MissingActionPolicy,
    invalid_params: InvalidParamsPolicy,
    rejected_id: Option<String>,
}

impl ControllerBuilder {
    fn new(id: impl Into<String>) -> Self {
        let settings = ControllerSettings::default();
        Self {
            id: id.into(),
            parent: None,
            default_action: settings.default_action,
            layout: settings.layout,
            inline_actions: HashMap::new(),
            action_map: HashMap::new(),
            hooks: ControllerHooks::default(),
            request_params: Params::new(),
            application: None,
            view: None,
            missing_action: Arc::new(|_: &Controller, id: &str| {
                Err(DispatchError::ActionNotFound(id.to_string()))
            }),
            invalid_params: Arc::new(|_: &Controller, _: &dyn Action, err: InvalidParams| {
                Err(DispatchError::InvalidParams(err))
            }),
            rejected_id: None,
        }
    }

    /// Apply the `[controller]` configuration section
    #[must_use]
    pub fn with_settings(mut self, settings: &ControllerSettings) -> Self {
        self.default_action.clone_from(&settings.default_action);
        self.layout.clone_from(&settings.layout);
        self
    }

    /// Place the controller inside `module`
    ///
    /// The controller keeps a weak reference; it never keeps its module alive.
    #[must_use]
    pub fn parent<M: Module + 'static>(mut self, module: &Arc<M>) -> Self {
        let module: Arc<dyn Module> = Arc::clone(module) as Arc<dyn Module>;
        self.parent = Some(Arc::downgrade(&module));
        self
    }

    /// Action id used when a request names no action
    #[must_use]
    pub fn default_action(mut self, id: impl Into<String>) -> Self {
        self.default_action = id.into();
        self
    }

    /// Layout wrapping rendered views
    #[must_use]
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Register an inline action handler
    ///
    /// The id must be a valid action id and must not be the reserved id
    /// [`RESERVED_ACTION_ID`]; otherwise [`build`](Self::build) fails with
    /// [`DispatchError::InvalidActionId`].
    #[must_use]
    pub fn inline<F, R>(mut self, id: impl Into<String>, params: Vec<ParamSpec>, handler: F) -> Self
    where
        F: Fn(&Controller, &BoundArgs) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<ActionOutput>,
    {
        let id = id.into();
        if id == RESERVED_ACTION_ID || !is_valid_action_id(&id) {
            tracing::warn!(controller = %self.id, action = %id, "Rejected inline action id");
            self.rejected_id.get_or_insert(id);
            return self;
        }
        let handler: InlineHandler =
            Arc::new(move |controller: &Controller, args: &BoundArgs| {
                handler(controller, args).map(Into::into)
            });
        self.inline_actions
            .insert(id.clone(), InlineAction::new(id, params, handler));
        self
    }

    /// Declare an action built by `factory` on every dispatch
    #[must_use]
    pub fn action<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&str, &Controller) -> Arc<dyn Action> + Send + Sync + 'static,
    {
        self.action_map.insert(id.into(), Arc::new(factory));
        self
    }

    /// Attach an `authorize` observer
    #[must_use]
    pub fn on_authorize<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut ActionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.authorize.attach(observer);
        self
    }

    /// Attach a `beforeAction` observer
    #[must_use]
    pub fn on_before_action<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut ActionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.before_action.attach(observer);
        self
    }

    /// Attach an `afterAction` observer
    #[must_use]
    pub fn on_after_action<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut ActionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.after_action.attach(observer);
        self
    }

    /// Attach a `beforeRender` observer
    #[must_use]
    pub fn on_before_render<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut ViewEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.before_render.attach(observer);
        self
    }

    /// Attach an `afterRender` observer
    #[must_use]
    pub fn on_after_render<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut ViewEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.after_render.attach(observer);
        self
    }

    /// Replace the unknown-action failure policy
    #[must_use]
    pub fn on_missing_action<F>(mut self, policy: F) -> Self
    where
        F: Fn(&Controller, &str) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        self.missing_action = Arc::new(policy);
        self
    }

    /// Replace the invalid-parameters failure policy
    #[must_use]
    pub fn on_invalid_params<F>(mut self, policy: F) -> Self
    where
        F: Fn(&Controller, &dyn Action, InvalidParams) -> Result<(), DispatchError>
            + Send
            + Sync
            + 'static,
    {
        self.invalid_params = Arc::new(policy);
        self
    }

    /// Application dispatcher used for qualified forwards
    #[must_use]
    pub fn application(mut self, application: Arc<dyn ApplicationDispatcher>) -> Self {
        self.application = Some(application);
        self
    }

    /// View renderer used by [`Controller::render`]
    #[must_use]
    pub fn view_renderer(mut self, view: Arc<dyn ViewRenderer>) -> Self {
        self.view = Some(view);
        self
    }

    /// Initial request parameter snapshot
    #[must_use]
    pub fn request_params(mut self, params: Params) -> Self {
        self.request_params = params;
        self
    }

    /// Finish the controller
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidActionId`] when an inline action was
    /// registered under an id that can never resolve.
    pub fn build(self) -> Result<Controller, DispatchError> {
        if let Some(id) = self.rejected_id {
            return Err(DispatchError::InvalidActionId(id));
        }
        Ok(Controller {
            id: self.id,
            parent: self.parent,
            default_action: RwLock::new(self.default_action),
            layout: self.layout,
            inline_actions: self.inline_actions,
            action_map: self.action_map,
            hooks: self.hooks,
            request_params: RwLock::new(self.request_params),
            current: ActionStacks::default(),
            application: self.application,
            view: self.view,
            missing_action: self.missing_action,
            invalid_params: self.invalid_params,
        })
    }
}

impl fmt::Debug for ControllerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerBuilder")
            .field("id", &self.id)
            .field("default_action", &self.default_action)
            .field("inline_actions", &self.inline_actions.keys().collect::<Vec<_>>())
            .field("action_map", &self.action_map.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
