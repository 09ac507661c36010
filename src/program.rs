//! Declarative programs: a node tree written as JSON and built against a [`Registry`].
//!
//! ```json
//! { "timeout_secs": 30,
//!   "root": { "type": "key", "name": "titles",
//!             "child": { "type": "text", "key": "title", "multiple": true,
//!                        "locator": { "by": "css", "path": "h2" } } } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{Result, ScrapeError};
use crate::functions::Registry;
use crate::locator::Locator;
use crate::nodes::{
    Attribute, BoxNode, Click, Constant, Enrich, Filter, IfExists, Key, Loop, MapNode, Range,
    SelectOption, SetCheckbox, Sleep, Table, Urls, Zip, DEFAULT_TIMEOUT,
};

fn empty_object() -> Value {
    json!({})
}

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum NodeSpec {
    Attribute {
        key: String,
        locator: Locator,
        attribute: String,
        #[serde(default)]
        multiple: bool,
        #[serde(default)]
        default: Value,
        timeout_secs: Option<u64>,
    },
    Text {
        key: String,
        locator: Locator,
        #[serde(default)]
        multiple: bool,
        #[serde(default)]
        default: Value,
        timeout_secs: Option<u64>,
    },
    Table {
        locator: Locator,
        timeout_secs: Option<u64>,
    },
    Constant {
        #[serde(default = "empty_object")]
        value: Value,
    },
    Map {
        function: String,
        child: Box<NodeSpec>,
    },
    Filter {
        predicate: String,
        child: Box<NodeSpec>,
    },
    Zip {
        left: Box<NodeSpec>,
        right: Box<NodeSpec>,
    },
    Key {
        name: String,
        child: Box<NodeSpec>,
    },
    Click {
        locator: Locator,
        child: Box<NodeSpec>,
        #[serde(default)]
        multiple: bool,
        timeout_secs: Option<u64>,
    },
    SetCheckbox {
        locator: Locator,
        checked: bool,
        child: Box<NodeSpec>,
        #[serde(default)]
        multiple: bool,
        timeout_secs: Option<u64>,
    },
    SelectOption {
        locator: Locator,
        label: String,
        child: Box<NodeSpec>,
        #[serde(default)]
        multiple: bool,
        timeout_secs: Option<u64>,
    },
    Sleep {
        seconds: f64,
        child: Box<NodeSpec>,
    },
    IfExists {
        locator: Locator,
        then: Box<NodeSpec>,
        otherwise: Box<NodeSpec>,
    },
    Loop {
        next: Locator,
        child: Box<NodeSpec>,
        timeout_secs: Option<u64>,
    },
    Range {
        name: String,
        start: i64,
        end: i64,
        #[serde(default = "one")]
        step: i64,
        child: Box<NodeSpec>,
    },
    Enrich {
        source: Box<NodeSpec>,
        enrich: Box<NodeSpec>,
    },
    Urls {
        urls: Vec<String>,
        child: Box<NodeSpec>,
    },
}

/// A program file: the root node plus run-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramFile {
    /// Default wait bound for nodes that do not set their own.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    pub root: NodeSpec,
}

impl ProgramFile {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn build(&self, registry: &Registry) -> Result<BoxNode> {
        let timeout = self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        Builder { registry, timeout }.build(&self.root)
    }
}

struct Builder<'r> {
    registry: &'r Registry,
    timeout: Duration,
}

impl Builder<'_> {
    fn timeout(&self, secs: Option<u64>) -> Duration {
        secs.map_or(self.timeout, Duration::from_secs)
    }

    fn build(&self, spec: &NodeSpec) -> Result<BoxNode> {
        let node: BoxNode = match spec {
            NodeSpec::Attribute { key, locator, attribute, multiple, default, timeout_secs } => {
                Box::new(
                    Attribute::new(key.clone(), locator.clone(), attribute.clone())
                        .set_multiple(*multiple)
                        .default_value(default.clone())
                        .with_timeout(self.timeout(*timeout_secs)),
                )
            }
            NodeSpec::Text { key, locator, multiple, default, timeout_secs } => Box::new(
                Attribute::text(key.clone(), locator.clone())
                    .set_multiple(*multiple)
                    .default_value(default.clone())
                    .with_timeout(self.timeout(*timeout_secs)),
            ),
            NodeSpec::Table { locator, timeout_secs } => Box::new(
                Table::new(locator.clone()).with_timeout(self.timeout(*timeout_secs)),
            ),
            NodeSpec::Constant { value } => Box::new(Constant::new(value.clone())),
            NodeSpec::Map { function, child } => Box::new(MapNode::shared(
                self.registry.transform(function)?,
                self.build(child)?,
            )),
            NodeSpec::Filter { predicate, child } => Box::new(Filter::shared(
                self.registry.predicate(predicate)?,
                self.build(child)?,
            )),
            NodeSpec::Zip { left, right } => {
                Box::new(Zip::boxed(self.build(left)?, self.build(right)?))
            }
            NodeSpec::Key { name, child } => Box::new(Key::boxed(name.clone(), self.build(child)?)),
            NodeSpec::Click { locator, child, multiple, timeout_secs } => Box::new(
                Click::boxed(locator.clone(), self.build(child)?)
                    .set_multiple(*multiple)
                    .with_timeout(self.timeout(*timeout_secs)),
            ),
            NodeSpec::SetCheckbox { locator, checked, child, multiple, timeout_secs } => Box::new(
                SetCheckbox::boxed(locator.clone(), *checked, self.build(child)?)
                    .set_multiple(*multiple)
                    .with_timeout(self.timeout(*timeout_secs)),
            ),
            NodeSpec::SelectOption { locator, label, child, multiple, timeout_secs } => Box::new(
                SelectOption::boxed(locator.clone(), label.clone(), self.build(child)?)
                    .set_multiple(*multiple)
                    .with_timeout(self.timeout(*timeout_secs)),
            ),
            NodeSpec::Sleep { seconds, child } => {
                let duration = Duration::try_from_secs_f64(*seconds).map_err(|_| {
                    ScrapeError::InvalidProgram(format!("bad sleep duration {seconds}"))
                })?;
                Box::new(Sleep::boxed(duration, self.build(child)?))
            }
            NodeSpec::IfExists { locator, then, otherwise } => Box::new(IfExists::boxed(
                locator.clone(),
                self.build(then)?,
                self.build(otherwise)?,
            )),
            NodeSpec::Loop { next, child, timeout_secs } => Box::new(
                Loop::boxed(next.clone(), self.build(child)?)
                    .with_timeout(self.timeout(*timeout_secs)),
            ),
            NodeSpec::Range { name, start, end, step, child } => {
                if *step == 0 {
                    return Err(ScrapeError::InvalidProgram(format!(
                        "range over `{name}` has a zero step"
                    )));
                }
                Box::new(Range::boxed(name.clone(), *start, *end, *step, self.build(child)?))
            }
            NodeSpec::Enrich { source, enrich } => {
                Box::new(Enrich::boxed(self.build(source)?, self.build(enrich)?))
            }
            NodeSpec::Urls { urls, child } => {
                if urls.is_empty() {
                    return Err(ScrapeError::InvalidProgram("urls node without urls".into()));
                }
                Box::new(Urls::boxed(urls.iter().cloned(), self.build(child)?))
            }
        };
        Ok(node)
    }
}
