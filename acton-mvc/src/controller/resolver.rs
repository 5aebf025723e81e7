//! Action resolution

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::action::Action;
use super::Controller;

/// Id that never resolves to an inline handler
///
/// Kept reserved so that ids stay compatible with applications ported from
/// frameworks where `"s"` collided with the action-map declaration method.
pub const RESERVED_ACTION_ID: &str = "s";

static ACTION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[a-z0-9_]+-)*[a-z0-9_]+$").expect("valid action id pattern"));

/// Whether `id` is a well-formed action id (`lower-case-words`)
#[must_use]
pub fn is_valid_action_id(id: &str) -> bool {
    ACTION_ID.is_match(id)
}

/// Outcome of resolving an action id
pub enum Resolution {
    /// A freshly built action
    Found(Arc<dyn Action>),
    /// Nothing matched; `id` is the id that was looked up
    NotFound {
        /// The id after default-action substitution
        id: String,
    },
}

impl Resolution {
    /// The resolved action, if any
    #[must_use]
    pub fn action(self) -> Option<Arc<dyn Action>> {
        match self {
            Self::Found(action) => Some(action),
            Self::NotFound { .. } => None,
        }
    }

    /// Whether resolution failed
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(action) => f.debug_tuple("Found").field(&action.id()).finish(),
            Self::NotFound { id } => f.debug_struct("NotFound").field("id", id).finish(),
        }
    }
}

impl Controller {
    /// Resolve an action id to a fresh action
    ///
    /// An empty id selects the default action. Inline handlers win over the
    /// declared action map; [`RESERVED_ACTION_ID`] and malformed ids never
    /// match an inline handler.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Resolution {
        let id = if id.is_empty() {
            self.default_action()
        } else {
            id.to_string()
        };

        if id != RESERVED_ACTION_ID && is_valid_action_id(&id) {
            if let Some(inline) = self.inline_actions.get(&id) {
                tracing::trace!(controller = %self.id, action = %id, "Resolved inline action");
                return Resolution::Found(Arc::new(inline.clone()));
            }
        }

        if let Some(factory) = self.action_map.get(&id) {
            tracing::trace!(controller = %self.id, action = %id, "Built declared action");
            return Resolution::Found(factory(&id, self));
        }

        Resolution::NotFound { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ActionOutput, BoundArgs};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Captcha {
        id: String,
    }

    impl Action for Captcha {
        fn id(&self) -> &str {
            &self.id
        }

        fn run(&self, _: &Controller, _: &BoundArgs) -> anyhow::Result<ActionOutput> {
            Ok(ActionOutput::Content("captcha".to_string()))
        }
    }

    #[test]
    fn test_action_id_grammar() {
        assert!(is_valid_action_id("index"));
        assert!(is_valid_action_id("reset-password"));
        assert!(is_valid_action_id("step_2"));
        assert!(!is_valid_action_id("Index"));
        assert!(!is_valid_action_id("-index"));
        assert!(!is_valid_action_id("a--b"));
        assert!(!is_valid_action_id(""));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let controller = Controller::builder("site").build().unwrap();
        let resolution = controller.resolve("missing");
        assert!(matches!(resolution, Resolution::NotFound { ref id } if id == "missing"));
    }

    #[test]
    fn test_empty_id_uses_default_action() {
        let controller = Controller::builder("site")
            .default_action("home")
            .inline("home", vec![], |_, _| Ok(()))
            .build()
            .unwrap();
        let action = controller.resolve("").action().unwrap();
        assert_eq!(action.id(), "home");

        let controller = Controller::builder("site").build().unwrap();
        assert!(matches!(
            controller.resolve(""),
            Resolution::NotFound { ref id } if id == "index"
        ));
    }

    #[test]
    fn test_inline_wins_over_action_map() {
        let controller = Controller::builder("site")
            .inline("index", vec![], |_, _| Ok(()))
            .action("index", |id, _| {
                Arc::new(Captcha {
                    id: format!("{id}-declared"),
                }) as Arc<dyn Action>
            })
            .build()
            .unwrap();
        assert_eq!(controller.resolve("index").action().unwrap().id(), "index");
    }

    #[test]
    fn test_reserved_id_skips_inline_table() {
        let controller = Controller::builder("site")
            .action("s", |id, _| Arc::new(Captcha { id: id.to_string() }) as Arc<dyn Action>)
            .build()
            .unwrap();
        assert_eq!(controller.resolve("s").action().unwrap().id(), "s");
    }

    #[test]
    fn test_declared_actions_are_built_per_call() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let controller = Controller::builder("site")
            .action("captcha", move |id, controller| {
                assert_eq!(controller.id(), "site");
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(Captcha { id: id.to_string() }) as Arc<dyn Action>
            })
            .build()
            .unwrap();

        let first = controller.resolve("captcha").action().unwrap();
        let second = controller.resolve("captcha").action().unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
