pub mod errors;
pub mod context;
pub mod driver;
pub mod engine;     // shape algebra shared by the combinators
pub mod functions;  // plugin model for Map/Filter
pub mod locator;
pub mod nodes;
pub mod program;
pub mod snapshot;
pub mod tabular;
mod parser;

use serde_json::Value;
use tracing::info;
use errors::Result;
use nodes::BoxNode;

/// A built extraction tree, ready to run against a driver.
pub struct Scraper {
    root: BoxNode,
}

impl Scraper {
    pub fn new(root: impl Node + 'static) -> Self {
        Self { root: Box::new(root) }
    }

    /// Build the tree declared in a program file.
    pub fn from_program(program: &ProgramFile, registry: &Registry) -> Result<Self> {
        Ok(Self { root: program.build(registry)? })
    }

    /// Evaluate the tree once, top to bottom, starting from an empty context.
    pub fn run(&self, driver: &mut dyn Driver) -> Result<Value> {
        run(self.root.as_ref(), driver)
    }
}

/// Convenience: evaluate any node against `driver` with an empty context.
pub fn run(root: &dyn Node, driver: &mut dyn Driver) -> Result<Value> {
    let value = root.evaluate(driver, &Context::new())?;
    info!(shape = engine::shape_name(&value), "extraction finished");
    Ok(value)
}

pub use context::Context;
pub use driver::{ClickOutcome, Driver, ElementHandle, SelectOutcome, WaitOutcome};
pub use errors::ScrapeError;
pub use functions::{Predicate, Registry, Transform};
pub use nodes::Node;
pub use program::{NodeSpec, ProgramFile};
pub use locator::{Locator, Strategy};
pub use snapshot::SnapshotDriver;
