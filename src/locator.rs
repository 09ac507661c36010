use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::errors::Result;

/// How a locator path is interpreted by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Css,
    #[serde(rename = "xpath")]
    XPath,
    ClassName,
    Id,
    TagName,
    Name,
    LinkText,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Css => "css selector",
            Strategy::XPath => "xpath",
            Strategy::ClassName => "class name",
            Strategy::Id => "id",
            Strategy::TagName => "tag name",
            Strategy::Name => "name",
            Strategy::LinkText => "link text",
        };
        f.write_str(s)
    }
}

/// A strategy plus a path template, e.g. `(xpath, "//div[{i}]/h2")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub by: Strategy,
    pub path: String,
}

impl Locator {
    pub fn new(by: Strategy, path: impl Into<String>) -> Self {
        Self { by, path: path.into() }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::new(Strategy::Css, path)
    }

    pub fn xpath(path: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, path)
    }

    pub fn class_name(path: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, path)
    }

    pub fn id(path: impl Into<String>) -> Self {
        Self::new(Strategy::Id, path)
    }

    /// Substitute the context into the path.
    pub fn resolve(&self, ctx: &Context) -> Result<ResolvedLocator> {
        Ok(ResolvedLocator {
            by: self.by,
            path: ctx.render(&self.path)?,
        })
    }
}

/// A locator whose path has no placeholders left; this is what drivers see.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedLocator {
    pub by: Strategy,
    pub path: String,
}

impl fmt::Display for ResolvedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.by, self.path)
    }
}
