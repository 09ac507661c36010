//! Scripted in-memory driver for exercising nodes without a browser.
//!
//! Pages are lists of `(path, element)` pairs; a locator matches every element
//! registered under exactly its resolved path. Clicking an element with a `goto`
//! switches the current page, which is how pagination is simulated. An element
//! marked `vanishes_after_wait` satisfies waits but is never returned by a find.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use scrape_tree::errors::{Result, ScrapeError};
use scrape_tree::locator::ResolvedLocator;
use scrape_tree::{ClickOutcome, Driver, ElementHandle, SelectOutcome, WaitOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Wait(String, Duration),
    FindOne(String),
    FindAll(String),
    Click(String),
    ForceClick(String),
    Select(String, String),
    Navigate(String),
    Pause(Duration),
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub attrs: HashMap<String, String>,
    pub html: String,
    pub interactable: bool,
    pub checked: bool,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub goto: Option<usize>,
    pub vanishes_after_wait: bool,
    pub force_fails: bool,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            attrs: HashMap::new(),
            html: String::new(),
            interactable: true,
            checked: false,
            options: Vec::new(),
            selected: None,
            goto: None,
            vanishes_after_wait: false,
            force_fails: false,
        }
    }
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: &str) -> Self {
        Self::new().attr("innerText", text)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = html.to_string();
        self
    }

    pub fn obscured(mut self) -> Self {
        self.interactable = false;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn options(mut self, labels: &[&str]) -> Self {
        self.options = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn goto(mut self, page: usize) -> Self {
        self.goto = Some(page);
        self
    }

    pub fn vanishes_after_wait(mut self) -> Self {
        self.vanishes_after_wait = true;
        self
    }

    pub fn force_fails(mut self) -> Self {
        self.force_fails = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub elements: Vec<(String, FakeElement)>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, element: FakeElement) -> Self {
        self.elements.push((path.to_string(), element));
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    pub pages: Vec<FakePage>,
    pub current: usize,
    pub urls: HashMap<String, usize>,
    pub calls: Vec<Call>,
}

impl FakeDriver {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self { pages, ..Self::default() }
    }

    pub fn single(page: FakePage) -> Self {
        Self::new(vec![page])
    }

    pub fn with_url(mut self, url: &str, page: usize) -> Self {
        self.urls.insert(url.to_string(), page);
        self
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn waits(&self) -> usize {
        self.count(|c| matches!(c, Call::Wait(..)))
    }

    pub fn element(&self, handle: &ElementHandle) -> &FakeElement {
        let (page, idx) = parse_handle(handle).expect("valid handle");
        &self.pages[page].elements[idx].1
    }

    fn matches(&self, path: &str, waiting: bool) -> Vec<ElementHandle> {
        self.pages[self.current]
            .elements
            .iter()
            .enumerate()
            .filter(|(_, (p, e))| p == path && (waiting || !e.vanishes_after_wait))
            .map(|(i, _)| ElementHandle::new(format!("p{}-e{}", self.current, i)))
            .collect()
    }

    fn lookup(&mut self, handle: &ElementHandle) -> Result<&mut FakeElement> {
        let (page, idx) = parse_handle(handle)
            .ok_or_else(|| ScrapeError::Driver(format!("bad handle {}", handle.0)))?;
        self.pages
            .get_mut(page)
            .and_then(|p| p.elements.get_mut(idx))
            .map(|(_, e)| e)
            .ok_or_else(|| ScrapeError::Driver(format!("stale handle {}", handle.0)))
    }

    fn activate(&mut self, handle: &ElementHandle) -> Result<()> {
        let el = self.lookup(handle)?;
        el.checked = !el.checked;
        if let Some(page) = el.goto {
            self.current = page;
        }
        Ok(())
    }
}

fn parse_handle(handle: &ElementHandle) -> Option<(usize, usize)> {
    let (p, e) = handle.0.strip_prefix('p')?.split_once("-e")?;
    Some((p.parse().ok()?, e.parse().ok()?))
}

impl Driver for FakeDriver {
    fn find_one(&mut self, locator: &ResolvedLocator) -> Result<Option<ElementHandle>> {
        self.calls.push(Call::FindOne(locator.path.clone()));
        Ok(self.matches(&locator.path, false).into_iter().next())
    }

    fn find_all(&mut self, locator: &ResolvedLocator) -> Result<Vec<ElementHandle>> {
        self.calls.push(Call::FindAll(locator.path.clone()));
        Ok(self.matches(&locator.path, false))
    }

    fn wait_for(&mut self, locator: &ResolvedLocator, timeout: Duration) -> Result<WaitOutcome> {
        self.calls.push(Call::Wait(locator.path.clone(), timeout));
        Ok(if self.matches(&locator.path, true).is_empty() {
            WaitOutcome::TimedOut
        } else {
            WaitOutcome::Found
        })
    }

    fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.lookup(element)?.attrs.get(name).cloned())
    }

    fn outer_html(&mut self, element: &ElementHandle) -> Result<String> {
        Ok(self.lookup(element)?.html.clone())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<ClickOutcome> {
        self.calls.push(Call::Click(element.0.clone()));
        if !self.lookup(element)?.interactable {
            return Ok(ClickOutcome::NotInteractable);
        }
        self.activate(element)?;
        Ok(ClickOutcome::Clicked)
    }

    fn force_click(&mut self, element: &ElementHandle) -> Result<()> {
        self.calls.push(Call::ForceClick(element.0.clone()));
        if self.lookup(element)?.force_fails {
            return Err(ScrapeError::Driver(format!("forced click on {} failed", element.0)));
        }
        self.activate(element)
    }

    fn is_checked(&mut self, element: &ElementHandle) -> Result<bool> {
        Ok(self.lookup(element)?.checked)
    }

    fn select_by_label(&mut self, element: &ElementHandle, label: &str) -> Result<SelectOutcome> {
        self.calls.push(Call::Select(element.0.clone(), label.to_string()));
        let el = self.lookup(element)?;
        if el.options.iter().any(|o| o == label) {
            el.selected = Some(label.to_string());
            Ok(SelectOutcome::Selected)
        } else {
            Ok(SelectOutcome::NotFound)
        }
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        self.calls.push(Call::Navigate(url.to_string()));
        self.current = *self
            .urls
            .get(url)
            .ok_or_else(|| ScrapeError::Driver(format!("unknown url {url}")))?;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.calls.push(Call::Pause(duration));
    }
}
