//! Leaf nodes: attribute and text extraction, tables and constants.

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::{Node, DEFAULT_TIMEOUT};
use crate::context::Context;
use crate::driver::{Driver, WaitOutcome};
use crate::errors::Result;
use crate::locator::Locator;
use crate::tabular::{HtmlTableParser, TableParser};

/// Reads one attribute (or DOM property) from the element(s) at `locator`.
///
/// Single mode yields `{key: value}` for the first match, or `default` when the
/// wait times out or the element is gone by the time it is read. Multiple mode
/// yields one `{key: value}` per match and an empty sequence on timeout.
pub struct Attribute {
    key: String,
    locator: Locator,
    attribute: String,
    multiple: bool,
    default: Value,
    timeout: Duration,
}

impl Attribute {
    pub fn new(key: impl Into<String>, locator: Locator, attribute: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            locator,
            attribute: attribute.into(),
            multiple: false,
            default: Value::Null,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Extracts the element's rendered inner text.
    pub fn text(key: impl Into<String>, locator: Locator) -> Self {
        Self::new(key, locator, INNER_TEXT)
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn set_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn default_value(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn entry(&self, value: Option<String>) -> Value {
        let mut m = Map::new();
        m.insert(self.key.clone(), value.map_or(Value::Null, Value::String));
        Value::Object(m)
    }
}

impl Node for Attribute {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let locator = self.locator.resolve(ctx)?;
        if driver.wait_for(&locator, self.timeout)? == WaitOutcome::TimedOut {
            debug!(%locator, key = %self.key, "extractor timed out");
            return Ok(if self.multiple { json!([]) } else { self.default.clone() });
        }

        if self.multiple {
            let mut out = Vec::new();
            for el in driver.find_all(&locator)? {
                out.push(self.entry(driver.attribute(&el, &self.attribute)?));
            }
            return Ok(Value::Array(out));
        }

        match driver.find_one(&locator)? {
            Some(el) => Ok(self.entry(driver.attribute(&el, &self.attribute)?)),
            None => {
                debug!(%locator, "element disappeared after wait");
                Ok(self.default.clone())
            }
        }
    }
}

/// The rendered text of an element.
pub const INNER_TEXT: &str = "innerText";

/// Parses the first table under `locator` into a sequence of records.
pub struct Table {
    locator: Locator,
    parser: Box<dyn TableParser>,
    timeout: Duration,
}

impl Table {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            parser: Box::new(HtmlTableParser),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_parser(mut self, parser: impl TableParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Node for Table {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        let locator = self.locator.resolve(ctx)?;
        if driver.wait_for(&locator, self.timeout)? == WaitOutcome::TimedOut {
            debug!(%locator, "table never appeared");
            return Ok(json!([]));
        }
        let Some(el) = driver.find_one(&locator)? else {
            return Ok(json!([]));
        };
        let markup = driver.outer_html(&el)?;
        let records = self.parser.parse_first_table(&markup)?;
        debug!(%locator, rows = records.len(), "parsed table");
        Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
    }
}

/// A fixed value with context substituted into its strings.
///
/// A string is rendered as a template; a mapping has both keys and string values
/// rendered. Anything else is returned unchanged.
pub struct Constant {
    value: Value,
}

impl Constant {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The empty sequence, used as the "nothing here" branch of conditionals.
    pub fn empty() -> Self {
        Self::new(json!([]))
    }
}

impl Node for Constant {
    fn evaluate(&self, _driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        match &self.value {
            Value::String(s) => Ok(Value::String(ctx.render(s)?)),
            Value::Object(map) => {
                let mut out = Map::new();
                for (k, v) in map {
                    let v = match v {
                        Value::String(s) => Value::String(ctx.render(s)?),
                        other => other.clone(),
                    };
                    out.insert(ctx.render(k)?, v);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }
}
