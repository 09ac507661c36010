//! A [`Driver`] over saved HTML documents.
//!
//! Useful for dry-running a program against pages captured earlier: nothing is
//! executed, so clicks and selections succeed without changing the document and
//! waits resolve immediately. `innerText` is approximated from the markup: text
//! nodes are concatenated and runs of whitespace collapse to one space, so
//! block-level line breaks a browser would render are not reproduced.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use ego_tree::NodeId;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::driver::{ClickOutcome, Driver, ElementHandle, SelectOutcome, WaitOutcome};
use crate::errors::{Result, ScrapeError};
use crate::locator::{ResolvedLocator, Strategy};

/// Everything we may later read about an element, captured when it is found.
#[derive(Debug, Clone)]
struct Captured {
    outer_html: String,
    inner_html: String,
    text: String,
    attrs: HashMap<String, String>,
    options: Vec<String>,
}

impl Captured {
    fn from_element(el: &ElementRef<'_>, option_sel: &Selector) -> Self {
        Self {
            outer_html: el.html(),
            inner_html: el.inner_html(),
            text: rendered_text(el),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            options: el
                .select(option_sel)
                .map(|o| rendered_text(&o))
                .collect(),
        }
    }
}

fn rendered_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().join(" ")
}

#[derive(Default)]
pub struct SnapshotDriver {
    pages: HashMap<String, String>,
    current: Option<Html>,
    elements: Vec<Captured>,
    handles: HashMap<NodeId, usize>,
}

impl SnapshotDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `html` as the document served for `url`.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn load_page(self, url: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(self.with_page(url, html))
    }

    fn document(&self) -> Result<&Html> {
        self.current
            .as_ref()
            .ok_or_else(|| ScrapeError::Driver("no page loaded".into()))
    }

    fn captured(&self, el: &ElementHandle) -> Result<&Captured> {
        el.0.strip_prefix("snap-")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| self.elements.get(n))
            .ok_or_else(|| ScrapeError::Driver(format!("stale element handle {}", el.0)))
    }
}

/// Translate a locator into an equivalent CSS selector.
fn css_for(locator: &ResolvedLocator) -> Result<String> {
    let path = &locator.path;
    match locator.by {
        Strategy::Css | Strategy::TagName => Ok(path.clone()),
        Strategy::ClassName => Ok(format!(".{path}")),
        Strategy::Id => Ok(format!("[id=\"{path}\"]")),
        Strategy::Name => Ok(format!("[name=\"{path}\"]")),
        Strategy::XPath | Strategy::LinkText => Err(ScrapeError::Unsupported(format!(
            "snapshot driver cannot resolve {locator}"
        ))),
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Driver(format!("bad selector {css:?}: {e:?}")))
}

impl Driver for SnapshotDriver {
    fn find_one(&mut self, locator: &ResolvedLocator) -> Result<Option<ElementHandle>> {
        Ok(self.find_all(locator)?.into_iter().next())
    }

    fn find_all(&mut self, locator: &ResolvedLocator) -> Result<Vec<ElementHandle>> {
        let sel = parse_selector(&css_for(locator)?)?;
        let option_sel = parse_selector("option")?;
        let Some(doc) = self.current.as_ref() else {
            return Err(ScrapeError::Driver("no page loaded".into()));
        };
        // Each element is captured once per page; later finds reuse its handle.
        let mut found = Vec::new();
        for el in doc.select(&sel) {
            let n = match self.handles.get(&el.id()) {
                Some(&n) => n,
                None => {
                    self.elements.push(Captured::from_element(&el, &option_sel));
                    let n = self.elements.len() - 1;
                    self.handles.insert(el.id(), n);
                    n
                }
            };
            found.push(ElementHandle::new(format!("snap-{n}")));
        }
        Ok(found)
    }

    fn wait_for(&mut self, locator: &ResolvedLocator, _timeout: Duration) -> Result<WaitOutcome> {
        let sel = parse_selector(&css_for(locator)?)?;
        let found = self.document()?.select(&sel).next().is_some();
        Ok(if found { WaitOutcome::Found } else { WaitOutcome::TimedOut })
    }

    fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let el = self.captured(element)?;
        Ok(match name {
            "innerText" | "textContent" => Some(el.text.clone()),
            "outerHTML" => Some(el.outer_html.clone()),
            "innerHTML" => Some(el.inner_html.clone()),
            other => el.attrs.get(other).cloned(),
        })
    }

    fn outer_html(&mut self, element: &ElementHandle) -> Result<String> {
        Ok(self.captured(element)?.outer_html.clone())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<ClickOutcome> {
        self.captured(element)?;
        debug!(element = %element.0, "click ignored on static snapshot");
        Ok(ClickOutcome::Clicked)
    }

    fn force_click(&mut self, element: &ElementHandle) -> Result<()> {
        self.captured(element).map(|_| ())
    }

    fn is_checked(&mut self, element: &ElementHandle) -> Result<bool> {
        Ok(self.captured(element)?.attrs.contains_key("checked"))
    }

    fn select_by_label(&mut self, element: &ElementHandle, label: &str) -> Result<SelectOutcome> {
        let el = self.captured(element)?;
        Ok(if el.options.iter().any(|o| o == label) {
            SelectOutcome::Selected
        } else {
            SelectOutcome::NotFound
        })
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        let html = match self.pages.get(url) {
            Some(html) => html.clone(),
            None => match url.strip_prefix("file://") {
                Some(path) => std::fs::read_to_string(path)?,
                None => return Err(ScrapeError::Driver(format!("no snapshot for {url}"))),
            },
        };
        debug!(%url, bytes = html.len(), "loaded snapshot");
        self.current = Some(Html::parse_document(&html));
        self.elements.clear();
        self.handles.clear();
        Ok(())
    }

    fn pause(&mut self, _duration: Duration) {}
}
