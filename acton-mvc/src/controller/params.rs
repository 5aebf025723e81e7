//! Action parameter binding
//!
//! Request parameters arrive as a name → value map. Each action declares the
//! parameters it accepts as a list of [`ParamSpec`]s; binding walks that list
//! in order and produces [`BoundArgs`], or reports why the request cannot be
//! served.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Request parameters keyed by name
pub type Params = BTreeMap<String, Value>;

/// Shape of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A single value; a list is rejected
    Scalar,
    /// A list; a single value is wrapped into a one-element list
    List,
}

/// Declared action parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name as it appears in the request
    pub name: String,
    /// Expected shape
    pub kind: ParamKind,
    /// Value used when the request omits the parameter
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A required scalar parameter
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Scalar,
            default: None,
        }
    }

    /// A scalar parameter with a default value
    #[must_use]
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Scalar,
            default: Some(default.into()),
        }
    }

    /// Turn this parameter into a list parameter
    #[must_use]
    pub const fn list(mut self) -> Self {
        self.kind = ParamKind::List;
        self
    }
}

/// Reasons a parameter map cannot be bound to an action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidParams {
    /// Required parameters are absent
    #[error("Missing required parameters: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// A scalar parameter received a list
    #[error("Invalid data received for parameter \"{0}\".")]
    InvalidData(String),

    /// Custom rejection from an action's own binding logic
    #[error("{0}")]
    Rejected(String),
}

/// Arguments produced by parameter binding, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    args: Vec<(String, Value)>,
}

impl BoundArgs {
    /// Empty argument set
    #[must_use]
    pub const fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Append an argument
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.args.push((name.into(), value));
    }

    /// Argument by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// String argument by name
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Argument by position
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.args.get(index).map(|(_, v)| v)
    }

    /// Number of bound arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether nothing was bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Iterate over `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl fmt::Display for BoundArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.args.iter().map(|(n, _)| n.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Bind request parameters to a declared parameter list
///
/// Parameters the action does not declare are ignored. Every missing
/// required parameter is reported at once.
///
/// # Errors
///
/// Returns [`InvalidParams::InvalidData`] when a scalar parameter receives a
/// list, and [`InvalidParams::Missing`] when required parameters are absent.
pub fn bind(specs: &[ParamSpec], params: &Params) -> Result<BoundArgs, InvalidParams> {
    let mut args = BoundArgs::new();
    let mut missing = Vec::new();

    for spec in specs {
        match (params.get(&spec.name), &spec.default) {
            (Some(value), _) => {
                let value = match spec.kind {
                    ParamKind::List if value.is_array() => value.clone(),
                    ParamKind::List => Value::Array(vec![value.clone()]),
                    ParamKind::Scalar if value.is_array() => {
                        return Err(InvalidParams::InvalidData(spec.name.clone()));
                    }
                    ParamKind::Scalar => value.clone(),
                };
                args.push(spec.name.clone(), value);
            }
            (None, Some(default)) => args.push(spec.name.clone(), default.clone()),
            (None, None) => missing.push(spec.name.clone()),
        }
    }

    if missing.is_empty() {
        Ok(args)
    } else {
        Err(InvalidParams::Missing(missing))
    }
}
