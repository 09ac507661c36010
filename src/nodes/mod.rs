//! The node tree: one trait, one struct per combinator.

use std::time::Duration;

use serde_json::Value;

use crate::context::Context;
use crate::driver::Driver;
use crate::errors::Result;

pub mod control;
pub mod extract;
pub mod interact;
pub mod structure;

pub use control::{Enrich, IfExists, Loop, Range, Urls};
pub use extract::{Attribute, Constant, Table};
pub use interact::{Click, SelectOption, SetCheckbox, Sleep};
pub use structure::{Filter, Key, MapNode, Zip};

/// How long leaf extractors and interactions wait for their locator by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// A unit of the extraction tree.
///
/// Evaluation may read or change the page through `driver` but never changes the
/// node itself, so a tree can be built once and evaluated as often as needed.
pub trait Node {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value>;
}

pub type BoxNode = Box<dyn Node>;

impl<N: Node + ?Sized> Node for Box<N> {
    fn evaluate(&self, driver: &mut dyn Driver, ctx: &Context) -> Result<Value> {
        (**self).evaluate(driver, ctx)
    }
}
