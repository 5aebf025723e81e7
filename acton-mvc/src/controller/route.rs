//! Hierarchical route naming
//!
//! Controllers live inside modules, and modules may nest inside other
//! modules up to the application. A controller's unique id is the path of
//! ids from the first module below the application down to the controller.

use std::sync::{Arc, Weak};

/// A container of controllers
pub trait Module: Send + Sync {
    /// Slash-separated id of this module below the application
    ///
    /// The application itself has an empty unique id.
    fn unique_id(&self) -> String;

    /// Whether this module is the top-level application
    fn is_application(&self) -> bool {
        false
    }
}

/// Plain module node
///
/// # Examples
///
/// ```rust
/// use acton_mvc::controller::{Module, ModuleNode};
///
/// let app = ModuleNode::application();
/// let admin = ModuleNode::child("admin", &app);
/// let reports = ModuleNode::child("reports", &admin);
///
/// assert_eq!(admin.unique_id(), "admin");
/// assert_eq!(reports.unique_id(), "admin/reports");
/// ```
#[derive(Debug)]
pub struct ModuleNode {
    id: String,
    parent: Option<Weak<dyn Module>>,
    application: bool,
}

impl ModuleNode {
    /// The top-level application
    #[must_use]
    pub fn application() -> Arc<Self> {
        Arc::new(Self {
            id: String::new(),
            parent: None,
            application: true,
        })
    }

    /// A module without a containing module
    #[must_use]
    pub fn root(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            parent: None,
            application: false,
        })
    }

    /// A module nested in `parent`
    #[must_use]
    pub fn child<M: Module + 'static>(id: impl Into<String>, parent: &Arc<M>) -> Arc<Self> {
        let parent: Arc<dyn Module> = Arc::clone(parent) as Arc<dyn Module>;
        Arc::new(Self {
            id: id.into(),
            parent: Some(Arc::downgrade(&parent)),
            application: false,
        })
    }

    /// Module id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Module for ModuleNode {
    fn unique_id(&self) -> String {
        if self.application {
            return String::new();
        }
        qualify(self.parent.as_ref(), &self.id)
    }

    fn is_application(&self) -> bool {
        self.application
    }
}

/// Prefix `id` with the unique id of `parent`
///
/// Recursion stops at the application, at a missing parent, and at a parent
/// that has already been dropped.
pub(crate) fn qualify(parent: Option<&Weak<dyn Module>>, id: &str) -> String {
    match parent.and_then(Weak::upgrade) {
        Some(parent) if !parent.is_application() => {
            let prefix = parent.unique_id();
            if prefix.is_empty() {
                id.to_string()
            } else {
                format!("{prefix}/{id}")
            }
        }
        _ => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_application_has_empty_unique_id() {
        let app = ModuleNode::application();
        assert!(app.is_application());
        assert_eq!(app.unique_id(), "");
    }

    #[test]
    fn test_module_under_application_uses_own_id() {
        let app = ModuleNode::application();
        let admin = ModuleNode::child("admin", &app);
        assert_eq!(admin.unique_id(), "admin");
    }

    #[test]
    fn test_dropped_parent_stops_recursion() {
        let admin = ModuleNode::root("admin");
        let reports = ModuleNode::child("reports", &admin);
        drop(admin);
        assert_eq!(reports.unique_id(), "reports");
    }

    proptest! {
        #[test]
        fn prop_nested_ids_join_with_slash(ids in proptest::collection::vec("[a-z]{1,8}", 1..5)) {
            let mut node = ModuleNode::root(ids[0].clone());
            let mut keep = vec![Arc::clone(&node)];
            for id in &ids[1..] {
                node = ModuleNode::child(id.clone(), &node);
                keep.push(Arc::clone(&node));
            }
            prop_assert_eq!(node.unique_id(), ids.join("/"));
        }
    }
}
