//! Lifecycle hooks
//!
//! A [`Hook`] is a named extension point with an ordered list of observers.
//! Triggering a hook hands the same mutable event value to every observer in
//! registration order. Observers cancel continued processing by clearing the
//! event's validity flag; they abort it outright by returning an error.
//!
//! # Examples
//!
//! ```rust
//! use acton_mvc::events::{Cancellable, Hook};
//!
//! #[derive(Debug, Default)]
//! struct Ping {
//!     is_valid: bool,
//! }
//!
//! impl Cancellable for Ping {
//!     fn is_valid(&self) -> bool {
//!         self.is_valid
//!     }
//!
//!     fn cancel(&mut self) {
//!         self.is_valid = false;
//!     }
//! }
//!
//! let mut hook = Hook::new("ping");
//! hook.attach(|event: &mut Ping| {
//!     event.cancel();
//!     Ok(())
//! });
//!
//! let mut event = Ping { is_valid: true };
//! hook.trigger(&mut event).unwrap();
//! assert!(!event.is_valid());
//! ```

use std::fmt;
use std::sync::Arc;

/// Observer callable attached to a [`Hook`]
pub type Observer<E> = Arc<dyn Fn(&mut E) -> anyhow::Result<()> + Send + Sync>;

/// Event payload that observers may cancel
pub trait Cancellable {
    /// Whether processing should continue
    fn is_valid(&self) -> bool;

    /// Stop continued processing
    fn cancel(&mut self);
}

/// Named extension point with observers invoked in registration order
pub struct Hook<E> {
    name: &'static str,
    observers: Vec<Observer<E>>,
}

impl<E> Hook<E> {
    /// Create a hook without observers
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            observers: Vec::new(),
        }
    }

    /// Hook name, used in log output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Attach an observer
    pub fn attach<F>(&mut self, observer: F)
    where
        F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    /// Number of attached observers
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notify every observer in registration order
    ///
    /// All observers run even after one of them cancels the event; the first
    /// observer error stops the notification and is returned.
    pub fn trigger(&self, event: &mut E) -> anyhow::Result<()> {
        tracing::trace!(hook = self.name, observers = self.observers.len(), "Triggering hook");
        for observer in &self.observers {
            observer(event)?;
        }
        Ok(())
    }
}

impl<E: Cancellable> Hook<E> {
    /// Trigger the hook and report whether processing may continue
    pub fn allows(&self, event: &mut E) -> anyhow::Result<bool> {
        self.trigger(event)?;
        if !event.is_valid() {
            tracing::debug!(hook = self.name, "Hook cancelled processing");
        }
        Ok(event.is_valid())
    }
}

impl<E> Clone for Hook<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            observers: self.observers.clone(),
        }
    }
}

impl<E> fmt::Debug for Hook<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("observers", &self.observers.len())
            .finish()
    }
}
