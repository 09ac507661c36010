//! Control flow: conditionals, pagination, ranges, enrichment and multi-page runs.

use serde_json::Value;
use tracing::debug;

use super::extract::Constant;
use super::interact::Click;
use super::{BoxNode, Node};
use crate::context::Context;
use crate::driver::Driver;
use crate::engine::{accumulate, shape_name, union};
use crate::errors::{Result, ScrapeError};
use crate::locator::Locator;

/// Evaluates `then` when `locator` currently matches anything, `otherwise` if not.
///
/// The presence check never waits.
pub struct IfExists {
    locator: Locator,
    then: BoxNode,
    otherwise: BoxNode,
}

impl IfExists {
    pub fn new(locator: Locator, then: impl Node + 'static, otherwise: impl Node + 'static) -> Self {
        Self::boxed(locator, Box::new(then), Box::new(otherwise))
    }

    pub fn boxed(locator: Locator, then: BoxNode, otherwise: BoxNode) -> Self {
        Self { locator, then, otherwise }
    }
}

impl Node for IfExists {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let locator = self.locator.resolve(ctx)?;
        let present = !driver.find_all(&locator)?.is_empty();
        debug!(%locator, present, "presence check");
        if present {
            self.then.evaluate(driver, ctx)
        } else {
            self.otherwise.evaluate(driver, ctx)
        }
    }
}

/// Pagination: evaluate the child, then click `next` and repeat for as long as
/// `next` is still on the page.
///
/// There is no iteration cap; a page that never retires its `next` element loops
/// forever.
pub struct Loop {
    next: Locator,
    child: BoxNode,
    click: Click,
}

impl Loop {
    pub fn new(next: Locator, child: impl Node + 'static) -> Self {
        Self::boxed(next, Box::new(child))
    }

    pub fn boxed(next: Locator, child: BoxNode) -> Self {
        let click = Click::new(next.clone(), Constant::empty());
        Self { next, child, click }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.click = self.click.with_timeout(timeout);
        self
    }
}

impl Node for Loop {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let mut acc = Vec::new();
        let mut page = 1usize;
        loop {
            accumulate(&mut acc, self.child.evaluate(driver, ctx)?);
            let next = self.next.resolve(ctx)?;
            if driver.find_all(&next)?.is_empty() {
                debug!(pages = page, items = acc.len(), "pagination finished");
                break;
            }
            debug!(page, %next, "advancing to next page");
            self.click.evaluate(driver, ctx)?;
            page += 1;
        }
        Ok(Value::Array(acc))
    }
}

/// Binds `name` to each integer of `start..end` (by `step`) and collects the
/// child's results into one sequence.
pub struct Range {
    name: String,
    start: i64,
    end: i64,
    step: i64,
    child: BoxNode,
}

impl Range {
    pub fn new(
        name: impl Into<String>,
        start: i64,
        end: i64,
        step: i64,
        child: impl Node + 'static,
    ) -> Self {
        Self::boxed(name, start, end, step, Box::new(child))
    }

    pub fn boxed(name: impl Into<String>, start: i64, end: i64, step: i64, child: BoxNode) -> Self {
        Self { name: name.into(), start, end, step, child }
    }

    fn values(&self) -> Result<impl Iterator<Item = i64>> {
        if self.step == 0 {
            return Err(ScrapeError::InvalidProgram(format!(
                "range over `{}` has a zero step",
                self.name
            )));
        }
        let (end, step) = (self.end, self.step);
        Ok(std::iter::successors(Some(self.start), move |i| i.checked_add(step))
            .take_while(move |&i| if step > 0 { i < end } else { i > end }))
    }
}

impl Node for Range {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let mut acc = Vec::new();
        for i in self.values()? {
            debug!(var = %self.name, value = i, "range iteration");
            let scoped = ctx.with(self.name.clone(), i);
            accumulate(&mut acc, self.child.evaluate(driver, &scoped)?);
        }
        Ok(Value::Array(acc))
    }
}

/// For each record of `source`, evaluates `enrich` with the record's fields bound
/// in the context and merges the two, the record's own fields winning.
pub struct Enrich {
    source: BoxNode,
    enrich: BoxNode,
}

impl Enrich {
    pub fn new(source: impl Node + 'static, enrich: impl Node + 'static) -> Self {
        Self::boxed(Box::new(source), Box::new(enrich))
    }

    pub fn boxed(source: BoxNode, enrich: BoxNode) -> Self {
        Self { source, enrich }
    }
}

impl Node for Enrich {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let records = match self.source.evaluate(driver, ctx)? {
            Value::Array(items) => items,
            other => {
                return Err(ScrapeError::ShapeMismatch(format!(
                    "enrich source must be a sequence, got {}",
                    shape_name(&other)
                )))
            }
        };
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let Value::Object(fields) = &record else {
                return Err(ScrapeError::ShapeMismatch(format!(
                    "enrich source elements must be mappings, got {}",
                    shape_name(&record)
                )));
            };
            let extra = self.enrich.evaluate(driver, &ctx.overlay(fields))?;
            out.push(union(&extra, &record)?);
        }
        Ok(Value::Array(out))
    }
}

/// Loads each URL in turn and collects the child's results.
///
/// With a single URL whose result is a mapping, that mapping is returned as-is
/// instead of a one-element sequence.
pub struct Urls {
    urls: Vec<String>,
    child: BoxNode,
}

impl Urls {
    pub fn new<I, S>(urls: I, child: impl Node + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::boxed(urls, Box::new(child))
    }

    pub fn boxed<I, S>(urls: I, child: BoxNode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { urls: urls.into_iter().map(Into::into).collect(), child }
    }
}

impl Node for Urls {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let mut acc = Vec::new();
        let mut last = Value::Null;
        for template in &self.urls {
            let url = ctx.render(template)?;
            debug!(%url, "navigating");
            driver.navigate(&url)?;
            last = self.child.evaluate(driver, ctx)?;
            match &last {
                Value::Object(_) => acc.push(last.clone()),
                Value::Array(items) => acc.extend(items.iter().cloned()),
                other => debug!(shape = shape_name(other), "ignoring non-container page result"),
            }
        }
        if self.urls.len() == 1 && last.is_object() {
            return Ok(last);
        }
        Ok(Value::Array(acc))
    }
}
