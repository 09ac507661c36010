use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::errors::{Result, ScrapeError};
use crate::parser::{parse_template, Piece};

/// Immutable variable bindings threaded down the node tree.
///
/// Binding a new variable produces a fresh context; the parent is never touched,
/// so a loop variable is only visible inside the subtree it was bound for.
#[derive(Clone, Debug, Default)]
pub struct Context {
    bindings: Arc<HashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// A child context with one extra binding.
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Context {
        let mut map = (*self.bindings).clone();
        map.insert(name.into(), value.into());
        Context { bindings: Arc::new(map) }
    }

    /// A child context with every field of `fields` laid over the current bindings.
    pub fn overlay(&self, fields: &Map<String, Value>) -> Context {
        if fields.is_empty() {
            return self.clone();
        }
        let mut map = (*self.bindings).clone();
        for (k, v) in fields {
            map.insert(k.clone(), v.clone());
        }
        Context { bindings: Arc::new(map) }
    }

    /// Substitute `{name}` placeholders with the bound values.
    pub fn render(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        for piece in parse_template(template)? {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Escaped(c) => out.push(c),
                Piece::Var(name) => {
                    let value = self.get(name).ok_or_else(|| {
                        ScrapeError::Template(format!("unbound variable `{name}` in {template:?}"))
                    })?;
                    push_scalar(&mut out, value);
                }
            }
        }
        trace!(template, rendered = %out, "rendered template");
        Ok(out)
    }
}

fn push_scalar(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => {
            let _ = write!(out, "{other}");
        }
    }
}
