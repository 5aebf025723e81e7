//! acton-mvc: controller action dispatch and mail sending for acton web applications
//!
//! Two building blocks meant to be embedded in a larger web application:
//!
//! - **Controllers** ([`controller`]): addressable request-handling units that
//!   run actions through a fixed lifecycle (resolve, authorize, bind
//!   parameters, `beforeAction`, run, `afterAction`), forward to other
//!   actions and routes, and render views.
//! - **Mailer** ([`mailer`]): message composition and a send pipeline with
//!   `beforeSend` / `afterSend` hooks, a file-transport debug mode and batch
//!   sending.
//!
//! HTTP handling, routing and SMTP wire protocol stay with the host
//! application; they plug in through the [`controller::ApplicationDispatcher`],
//! [`view::ViewRenderer`] and [`mailer::MailTransport`] traits.
//!
//! # Quick Start
//!
//! ```rust
//! use acton_mvc::prelude::*;
//!
//! # fn main() -> Result<(), DispatchError> {
//! let controller = Controller::builder("site")
//!     .inline("index", vec![], |_, _| Ok("Hello!"))
//!     .build()?;
//!
//! let dispatched = controller.dispatch("", None)?;
//! assert_eq!(dispatched.status, ExitStatus::OK);
//! assert_eq!(dispatched.output, Some(ActionOutput::Content("Hello!".into())));
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod mailer;
pub mod observability;
pub mod testing;
pub mod view;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use acton_mvc::prelude::*;
    //! ```

    pub use crate::config::ActonMvcConfig;

    pub use crate::controller::{
        Action, ActionEvent, ActionOutput, ApplicationDispatcher, BoundArgs, Controller,
        ExitStatus, Module, ModuleNode, ParamSpec, Params, ViewEvent,
    };

    pub use crate::error::DispatchError;

    pub use crate::events::{Cancellable, Hook};

    pub use crate::mailer::{
        ConsoleTransport, MailError, MailEvent, MailMessage, MailTransport, MailViews, Mailer,
        SmtpTransport,
    };

    pub use crate::view::{MiniJinjaRenderer, ViewContext, ViewRenderer};

    pub use serde_json::json;
}
