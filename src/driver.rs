//! The automation capability the engine consumes.
//!
//! The engine never talks to a browser directly; it is handed a `&mut dyn Driver`
//! and every page read or side effect goes through it. Real browser bindings,
//! the snapshot driver and test fakes all plug in here.

use std::time::Duration;

use crate::errors::Result;
use crate::locator::ResolvedLocator;

/// Opaque reference to a page element, owned by the driver that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Found,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Clicked,
    /// The element exists but is hidden, disabled or covered by another element.
    NotInteractable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    NotFound,
}

pub trait Driver {
    /// First element matching `locator`, without waiting.
    fn find_one(&mut self, locator: &ResolvedLocator) -> Result<Option<ElementHandle>>;

    /// All elements matching `locator` in document order, without waiting.
    fn find_all(&mut self, locator: &ResolvedLocator) -> Result<Vec<ElementHandle>>;

    /// Block until at least one element matches or `timeout` elapses.
    fn wait_for(&mut self, locator: &ResolvedLocator, timeout: Duration) -> Result<WaitOutcome>;

    /// Attribute or DOM property (`innerText`, `outerHTML`, ...) of an element.
    fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    fn outer_html(&mut self, element: &ElementHandle) -> Result<String>;

    fn click(&mut self, element: &ElementHandle) -> Result<ClickOutcome>;

    /// Programmatic activation that bypasses visibility and overlay checks.
    fn force_click(&mut self, element: &ElementHandle) -> Result<()>;

    fn is_checked(&mut self, element: &ElementHandle) -> Result<bool>;

    fn select_by_label(&mut self, element: &ElementHandle, label: &str) -> Result<SelectOutcome>;

    fn navigate(&mut self, url: &str) -> Result<()>;

    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
