//! Nodes that act on the page and then hand over to their child.
//!
//! A missing interaction target is an authoring error, not an expected absence,
//! so these nodes fail the run when their locator times out.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::{BoxNode, Node, DEFAULT_TIMEOUT};
use crate::context::Context;
use crate::driver::{ClickOutcome, Driver, ElementHandle, SelectOutcome, WaitOutcome};
use crate::errors::{Result, ScrapeError};
use crate::locator::{Locator, ResolvedLocator};

/// Wait for `locator`, then return the first match, or all matches when `multiple`.
fn targets(
    driver: &mut dyn Driver,
    locator: &ResolvedLocator,
    multiple: bool,
    timeout: Duration,
) -> Result<Vec<ElementHandle>> {
    if driver.wait_for(locator, timeout)? == WaitOutcome::TimedOut {
        return Err(ScrapeError::Timeout { locator: locator.to_string() });
    }
    if multiple {
        return driver.find_all(locator);
    }
    match driver.find_one(locator)? {
        Some(el) => Ok(vec![el]),
        None => Err(ScrapeError::ElementMissing { locator: locator.to_string() }),
    }
}

/// Normal click, falling back once to a programmatic click when the element is
/// not interactable.
pub(crate) fn click_with_fallback(driver: &mut dyn Driver, el: &ElementHandle) -> Result<()> {
    match driver.click(el)? {
        ClickOutcome::Clicked => Ok(()),
        ClickOutcome::NotInteractable => {
            warn!(element = %el.0, "element not interactable, forcing click");
            driver.force_click(el)
        }
    }
}

/// Clicks the element(s) at `locator`, then evaluates the child.
pub struct Click {
    locator: Locator,
    child: BoxNode,
    multiple: bool,
    timeout: Duration,
}

impl Click {
    pub fn new(locator: Locator, child: impl Node + 'static) -> Self {
        Self::boxed(locator, Box::new(child))
    }

    pub fn boxed(locator: Locator, child: BoxNode) -> Self {
        Self { locator, child, multiple: false, timeout: DEFAULT_TIMEOUT }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn set_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Node for Click {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let locator = self.locator.resolve(ctx)?;
        let els = targets(driver, &locator, self.multiple, self.timeout)?;
        debug!(%locator, count = els.len(), "clicking");
        for el in &els {
            click_with_fallback(driver, el)?;
        }
        self.child.evaluate(driver, ctx)
    }
}

/// Brings checkbox(es) to the desired state, clicking only those that differ.
pub struct SetCheckbox {
    locator: Locator,
    checked: bool,
    child: BoxNode,
    multiple: bool,
    timeout: Duration,
}

impl SetCheckbox {
    pub fn new(locator: Locator, checked: bool, child: impl Node + 'static) -> Self {
        Self::boxed(locator, checked, Box::new(child))
    }

    pub fn boxed(locator: Locator, checked: bool, child: BoxNode) -> Self {
        Self { locator, checked, child, multiple: false, timeout: DEFAULT_TIMEOUT }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn set_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Node for SetCheckbox {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let locator = self.locator.resolve(ctx)?;
        for el in targets(driver, &locator, self.multiple, self.timeout)? {
            if driver.is_checked(&el)? != self.checked {
                debug!(%locator, checked = self.checked, "toggling checkbox");
                click_with_fallback(driver, &el)?;
            }
        }
        self.child.evaluate(driver, ctx)
    }
}

/// Chooses an option by its visible label on select control(s).
pub struct SelectOption {
    locator: Locator,
    label: String,
    child: BoxNode,
    multiple: bool,
    timeout: Duration,
}

impl SelectOption {
    pub fn new(locator: Locator, label: impl Into<String>, child: impl Node + 'static) -> Self {
        Self::boxed(locator, label, Box::new(child))
    }

    pub fn boxed(locator: Locator, label: impl Into<String>, child: BoxNode) -> Self {
        Self {
            locator,
            label: label.into(),
            child,
            multiple: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn set_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Node for SelectOption {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let locator = self.locator.resolve(ctx)?;
        let label = ctx.render(&self.label)?;
        for el in targets(driver, &locator, self.multiple, self.timeout)? {
            if driver.select_by_label(&el, &label)? == SelectOutcome::NotFound {
                return Err(ScrapeError::OptionNotFound { locator: locator.to_string(), label });
            }
        }
        debug!(%locator, %label, "selected option");
        self.child.evaluate(driver, ctx)
    }
}

/// Gives the page time to settle before evaluating the child.
pub struct Sleep {
    duration: Duration,
    child: BoxNode,
}

impl Sleep {
    pub fn new(duration: Duration, child: impl Node + 'static) -> Self {
        Self::boxed(duration, Box::new(child))
    }

    pub fn boxed(duration: Duration, child: BoxNode) -> Self {
        Self { duration, child }
    }
}

impl Node for Sleep {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        driver.pause(self.duration);
        self.child.evaluate(driver, ctx)
    }
}
