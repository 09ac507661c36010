use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use crate::errors::{Result, ScrapeError};

/// Record transformation applied by a Map node.
///
/// Receives a single record (a mapping, or an element of a sequence) and must
/// return a value of the same shape category.
pub trait Transform: Send + Sync {
    fn apply(&self, record: Value) -> Result<Value>;
}

/// Record test applied by a Filter node.
pub trait Predicate: Send + Sync {
    fn test(&self, record: &Value) -> bool;
}

impl<F> Transform for F
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn apply(&self, record: Value) -> Result<Value> {
        self(record)
    }
}

impl<F> Predicate for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn test(&self, record: &Value) -> bool {
        self(record)
    }
}

/// Thread-safe registry of named transforms and predicates, used when building
/// programs from declarations.
#[derive(Clone, Default)]
pub struct Registry {
    transforms: Arc<HashMap<String, Arc<dyn Transform>>>,
    predicates: Arc<HashMap<String, Arc<dyn Predicate>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register_transform("collapse_whitespace", builtins::CollapseWhitespace);
        reg.register_transform("trim", builtins::Trim);
        reg.register_transform("lower", builtins::Lower);
        reg.register_transform("upper", builtins::Upper);
        reg.register_predicate("non_empty", builtins::NonEmpty);
        reg
    }

    pub fn register_transform<T: Transform + 'static>(&mut self, name: impl Into<String>, t: T) {
        Arc::make_mut(&mut self.transforms).insert(name.into(), Arc::new(t));
    }

    pub fn register_predicate<P: Predicate + 'static>(&mut self, name: impl Into<String>, p: P) {
        Arc::make_mut(&mut self.predicates).insert(name.into(), Arc::new(p));
    }

    pub fn transform(&self, name: &str) -> Result<Arc<dyn Transform>> {
        self.transforms
            .get(name)
            .cloned()
            .ok_or_else(|| ScrapeError::UnknownFunction(name.to_string()))
    }

    pub fn predicate(&self, name: &str) -> Result<Arc<dyn Predicate>> {
        self.predicates
            .get(name)
            .cloned()
            .ok_or_else(|| ScrapeError::UnknownFunction(name.to_string()))
    }
}

pub mod builtins {
    use super::*;
    use itertools::Itertools;

    /// Apply `f` to every string field of a mapping, or to a bare string.
    fn map_strings(record: Value, f: impl Fn(&str) -> String) -> Value {
        match record {
            Value::String(s) => Value::String(f(&s)),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => (k, Value::String(f(&s))),
                        other => (k, other),
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Trims and squeezes every whitespace run down to one space.
    pub struct CollapseWhitespace;
    impl Transform for CollapseWhitespace {
        fn apply(&self, record: Value) -> Result<Value> {
            Ok(map_strings(record, |s| s.split_whitespace().join(" ")))
        }
    }

    pub struct Trim;
    impl Transform for Trim {
        fn apply(&self, record: Value) -> Result<Value> {
            Ok(map_strings(record, |s| s.trim().to_string()))
        }
    }

    pub struct Lower;
    impl Transform for Lower {
        fn apply(&self, record: Value) -> Result<Value> {
            Ok(map_strings(record, str::to_lowercase))
        }
    }

    pub struct Upper;
    impl Transform for Upper {
        fn apply(&self, record: Value) -> Result<Value> {
            Ok(map_strings(record, str::to_uppercase))
        }
    }

    /// Keeps records that are not null and whose string fields are all non-blank.
    pub struct NonEmpty;
    impl Predicate for NonEmpty {
        fn test(&self, record: &Value) -> bool {
            match record {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                Value::Object(map) => map
                    .values()
                    .all(|v| v.as_str().map_or(true, |s| !s.trim().is_empty())),
                _ => true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collapse_whitespace_cleans_string_fields() {
        let reg = Registry::with_builtins();
        let out = reg
            .transform("collapse_whitespace")
            .unwrap()
            .apply(json!({"title": "  De  overheid\n moet ", "n": 1}))
            .unwrap();
        assert_eq!(out, json!({"title": "De overheid moet", "n": 1}));
    }

    #[test]
    fn closures_register_as_functions() {
        let mut reg = Registry::new();
        reg.register_predicate("even", |v: &Value| v["n"].as_i64().map_or(false, |n| n % 2 == 0));
        let even = reg.predicate("even").unwrap();
        assert!(even.test(&json!({"n": 4})));
        assert!(!even.test(&json!({"n": 3})));
    }

    #[test]
    fn unknown_names_are_reported() {
        let err = Registry::with_builtins().transform("nope").err().unwrap();
        assert!(matches!(err, ScrapeError::UnknownFunction(name) if name == "nope"));
    }

    #[test]
    fn non_empty_rejects_blank_fields() {
        let p = builtins::NonEmpty;
        assert!(p.test(&json!({"party": "A"})));
        assert!(!p.test(&json!({"party": "  "})));
        assert!(!p.test(&Value::Null));
    }
}
