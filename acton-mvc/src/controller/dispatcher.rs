//! The `run` lifecycle

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::action::{Action, ActionOutput, ActionTarget, ExitStatus};
use super::hooks::ActionEvent;
use super::params::Params;
use super::resolver::Resolution;
use super::Controller;
use crate::error::DispatchError;

/// Result of a dispatch that ran to completion or short-circuited
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    /// Exit status: the action's own status, `0`, or `1` for short-circuits
    pub status: ExitStatus,
    /// Action output after `afterAction`; `None` when the action never ran
    pub output: Option<ActionOutput>,
}

impl Dispatched {
    const fn aborted() -> Self {
        Self {
            status: ExitStatus::ERROR,
            output: None,
        }
    }
}

/// Current-action stacks, one per dispatching thread
pub(crate) type ActionStacks = Mutex<HashMap<ThreadId, Vec<Arc<dyn Action>>>>;

/// Keeps an action on the calling thread's current-action stack for one call
///
/// Dropping the guard truncates that stack back to where it was, on normal
/// return, early return and panic unwind alike. Other threads' stacks are
/// never touched.
struct CurrentActionGuard<'a> {
    stacks: &'a ActionStacks,
    thread: ThreadId,
    depth: usize,
}

impl<'a> CurrentActionGuard<'a> {
    fn push(stacks: &'a ActionStacks, action: Arc<dyn Action>) -> Self {
        let thread = thread::current().id();
        let mut stacks_guard = stacks.lock();
        let stack = stacks_guard.entry(thread).or_default();
        let depth = stack.len();
        stack.push(action);
        Self {
            stacks,
            thread,
            depth,
        }
    }
}

impl Drop for CurrentActionGuard<'_> {
    fn drop(&mut self) {
        let mut stacks = self.stacks.lock();
        if let Some(stack) = stacks.get_mut(&self.thread) {
            stack.truncate(self.depth);
            if stack.is_empty() {
                stacks.remove(&self.thread);
            }
        }
    }
}

impl Controller {
    /// Run an action through the full lifecycle and return its exit status
    ///
    /// `params` of `None` uses the controller's request parameter snapshot.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ActionNotFound`] / [`DispatchError::InvalidParams`]
    ///   from the default failure policies
    /// - [`DispatchError::Hook`] when a hook observer fails
    /// - [`DispatchError::Action`] when the action body fails
    pub fn run(
        &self,
        target: impl Into<ActionTarget>,
        params: Option<&Params>,
    ) -> Result<ExitStatus, DispatchError> {
        self.dispatch(target, params).map(|dispatched| dispatched.status)
    }

    /// Like [`run`](Self::run), also returning the action's output
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn dispatch(
        &self,
        target: impl Into<ActionTarget>,
        params: Option<&Params>,
    ) -> Result<Dispatched, DispatchError> {
        let action = match target.into() {
            ActionTarget::Action(action) => action,
            ActionTarget::Id(id) => match self.resolve(&id) {
                Resolution::Found(action) => action,
                Resolution::NotFound { id } => {
                    warn!(controller = %self.unique_id(), action = %id, "Action not found");
                    (self.missing_action)(self, &id)?;
                    return Ok(Dispatched::aborted());
                }
            },
        };

        let _current = CurrentActionGuard::push(&self.current, Arc::clone(&action));
        debug!(route = %self.route(), "Dispatching action");

        let mut event = ActionEvent::new(Arc::clone(&action));
        if !self
            .hooks
            .authorize
            .allows(&mut event)
            .map_err(DispatchError::Hook)?
        {
            debug!(route = %self.route(), "Action not authorized");
            return Ok(Dispatched::aborted());
        }

        let snapshot;
        let params = match params {
            Some(params) => params,
            None => {
                snapshot = self.request_params();
                &snapshot
            }
        };

        let args = match action.bind_params(params) {
            Ok(args) => args,
            Err(err) => {
                warn!(route = %self.route(), error = %err, "Invalid action parameters");
                (self.invalid_params)(self, action.as_ref(), err)?;
                return Ok(Dispatched::aborted());
            }
        };

        let mut event = ActionEvent::new(Arc::clone(&action));
        if !self
            .hooks
            .before_action
            .allows(&mut event)
            .map_err(DispatchError::Hook)?
        {
            debug!(route = %self.route(), "Action cancelled before running");
            return Ok(Dispatched::aborted());
        }

        let output = action.run(self, &args).map_err(DispatchError::Action)?;

        let mut event = ActionEvent::with_result(action, output);
        self.hooks
            .after_action
            .trigger(&mut event)
            .map_err(DispatchError::Hook)?;

        let output = event.result.take().unwrap_or_default();
        let status = output.exit_status();
        debug!(route = %self.route(), %status, "Action finished");

        Ok(Dispatched {
            status,
            output: Some(output),
        })
    }
}
