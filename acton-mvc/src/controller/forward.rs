//! Forwarding to other actions and routes

use std::ops::ControlFlow;

use tracing::debug;

use super::action::ExitStatus;
use super::params::Params;
use super::Controller;
use crate::error::DispatchError;

/// Application-level dispatcher for routes outside the current controller
#[cfg_attr(test, mockall::automock)]
pub trait ApplicationDispatcher: Send + Sync {
    /// Dispatch a qualified route
    ///
    /// # Errors
    ///
    /// Returns whatever error the routed controller raised.
    fn dispatch(&self, route: &str, params: &Params) -> Result<ExitStatus, DispatchError>;

    /// Notify the application that the current request is finished
    fn end(&self, status: ExitStatus);
}

impl Controller {
    /// Hand processing over to another action or route
    ///
    /// A route without `/` names an action of this controller and runs
    /// locally. Any other route goes to the application dispatcher; relative
    /// routes (no leading `/`) are first prefixed with the unique id of the
    /// containing module, unless that module is the application.
    ///
    /// With `should_exit` the application is told the request has ended and
    /// [`ControlFlow::Break`] is returned; callers must stop processing.
    /// Otherwise [`ControlFlow::Continue`] hands the status back.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoApplication`] for a qualified route without an
    ///   application dispatcher
    /// - any error from the local run or the application dispatcher
    pub fn forward(
        &self,
        route: &str,
        params: &Params,
        should_exit: bool,
    ) -> Result<ControlFlow<ExitStatus, ExitStatus>, DispatchError> {
        let status = if route.contains('/') {
            let application = self
                .application
                .as_ref()
                .ok_or_else(|| DispatchError::NoApplication(route.to_string()))?;
            let qualified = self.qualify_route(route);
            debug!(from = %self.route(), to = %qualified, "Forwarding to application route");
            application.dispatch(&qualified, params)?
        } else {
            debug!(from = %self.route(), to = %route, "Forwarding to local action");
            self.run(route, Some(params))?
        };

        if should_exit {
            if let Some(application) = &self.application {
                application.end(status);
            }
            return Ok(ControlFlow::Break(status));
        }
        Ok(ControlFlow::Continue(status))
    }

    fn qualify_route(&self, route: &str) -> String {
        if route.starts_with('/') {
            return route.to_string();
        }
        match self.parent() {
            Some(module) if !module.is_application() => {
                let prefix = module.unique_id();
                if prefix.is_empty() {
                    route.to_string()
                } else {
                    format!("{prefix}/{route}")
                }
            }
            _ => route.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ModuleNode;
    use mockall::predicate::eq;
    use std::sync::Arc;

    #[test]
    fn test_local_forward_runs_action() {
        let controller = Controller::builder("site")
            .inline("about", vec![], |_, _| Ok(3))
            .build()
            .unwrap();

        let flow = controller.forward("about", &Params::new(), false).unwrap();
        assert_eq!(flow, ControlFlow::Continue(ExitStatus::from(3)));
    }

    #[test]
    fn test_relative_route_is_prefixed_with_module() {
        let admin = ModuleNode::root("admin");
        let mut app = MockApplicationDispatcher::new();
        app.expect_dispatch()
            .with(eq("admin/users/list"), eq(Params::new()))
            .times(1)
            .returning(|_, _| Ok(ExitStatus::OK));
        app.expect_end().never();

        let controller = Controller::builder("site")
            .parent(&admin)
            .application(Arc::new(app))
            .build()
            .unwrap();

        let flow = controller.forward("users/list", &Params::new(), false).unwrap();
        assert_eq!(flow, ControlFlow::Continue(ExitStatus::OK));
    }

    #[test]
    fn test_rooted_route_is_left_alone() {
        let admin = ModuleNode::root("admin");
        let mut app = MockApplicationDispatcher::new();
        app.expect_dispatch()
            .with(eq("/site/login"), eq(Params::new()))
            .times(1)
            .returning(|_, _| Ok(ExitStatus::OK));

        let controller = Controller::builder("users")
            .parent(&admin)
            .application(Arc::new(app))
            .build()
            .unwrap();

        controller.forward("/site/login", &Params::new(), false).unwrap();
    }

    #[test]
    fn test_route_under_application_is_not_prefixed() {
        let root = ModuleNode::application();
        let mut app = MockApplicationDispatcher::new();
        app.expect_dispatch()
            .with(eq("users/list"), eq(Params::new()))
            .times(1)
            .returning(|_, _| Ok(ExitStatus::OK));

        let controller = Controller::builder("site")
            .parent(&root)
            .application(Arc::new(app))
            .build()
            .unwrap();

        controller.forward("users/list", &Params::new(), false).unwrap();
    }

    #[test]
    fn test_should_exit_ends_request() {
        let mut app = MockApplicationDispatcher::new();
        app.expect_dispatch()
            .returning(|_, _| Ok(ExitStatus::from(4)));
        app.expect_end()
            .with(eq(ExitStatus::from(4)))
            .times(1)
            .return_const(());

        let controller = Controller::builder("site")
            .application(Arc::new(app))
            .build()
            .unwrap();

        let flow = controller.forward("users/list", &Params::new(), true).unwrap();
        assert_eq!(flow, ControlFlow::Break(ExitStatus::from(4)));
    }

    #[test]
    fn test_qualified_route_without_application_fails() {
        let controller = Controller::builder("site").build().unwrap();
        let err = controller
            .forward("users/list", &Params::new(), false)
            .unwrap_err();
        assert!(matches!(err, DispatchError::NoApplication(route) if route == "users/list"));
    }
}
