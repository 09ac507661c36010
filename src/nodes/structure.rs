//! Combinators that reshape or combine their children's results.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{BoxNode, Node};
use crate::context::Context;
use crate::driver::Driver;
use crate::engine::{shape_name, zip};
use crate::errors::{Result, ScrapeError};
use crate::functions::{Predicate, Transform};

/// Applies a transform to a mapping result, or to every element of a sequence.
///
/// `Null` passes through untouched so an absent extraction stays absent.
pub struct MapNode {
    transform: Arc<dyn Transform>,
    child: BoxNode,
}

impl MapNode {
    pub fn new(transform: impl Transform + 'static, child: impl Node + 'static) -> Self {
        Self::shared(Arc::new(transform), Box::new(child))
    }

    pub fn shared(transform: Arc<dyn Transform>, child: BoxNode) -> Self {
        Self { transform, child }
    }
}

impl Node for MapNode {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        match self.child.evaluate(driver, ctx)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.transform.apply(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Null => Ok(Value::Null),
            record @ Value::Object(_) => self.transform.apply(record),
            other => Err(ScrapeError::ShapeMismatch(format!(
                "map expects a mapping or sequence, got {}",
                shape_name(&other)
            ))),
        }
    }
}

/// Keeps the elements of a sequence result that satisfy a predicate, in order.
pub struct Filter {
    predicate: Arc<dyn Predicate>,
    child: BoxNode,
}

impl Filter {
    pub fn new(predicate: impl Predicate + 'static, child: impl Node + 'static) -> Self {
        Self::shared(Arc::new(predicate), Box::new(child))
    }

    pub fn shared(predicate: Arc<dyn Predicate>, child: BoxNode) -> Self {
        Self { predicate, child }
    }
}

impl Node for Filter {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        match self.child.evaluate(driver, ctx)? {
            Value::Array(items) => Ok(Value::Array(
                items.into_iter().filter(|v| self.predicate.test(v)).collect(),
            )),
            other => Err(ScrapeError::ShapeMismatch(format!(
                "filter expects a sequence, got {}",
                shape_name(&other)
            ))),
        }
    }
}

/// Evaluates both children (left first) and merges the results, see [`zip`].
pub struct Zip {
    left: BoxNode,
    right: BoxNode,
}

impl Zip {
    pub fn new(left: impl Node + 'static, right: impl Node + 'static) -> Self {
        Self::boxed(Box::new(left), Box::new(right))
    }

    pub fn boxed(left: BoxNode, right: BoxNode) -> Self {
        Self { left, right }
    }
}

impl Node for Zip {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let left = self.left.evaluate(driver, ctx)?;
        let right = self.right.evaluate(driver, ctx)?;
        zip(&left, &right)
    }
}

/// Wraps the child's result as `{name: result}`.
pub struct Key {
    name: String,
    child: BoxNode,
}

impl Key {
    pub fn new(name: impl Into<String>, child: impl Node + 'static) -> Self {
        Self::boxed(name, Box::new(child))
    }

    pub fn boxed(name: impl Into<String>, child: BoxNode) -> Self {
        Self { name: name.into(), child }
    }
}

impl Node for Key {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let value = self.child.evaluate(driver, ctx)?;
        let mut out = Map::new();
        out.insert(self.name.clone(), value);
        Ok(Value::Object(out))
    }
}
