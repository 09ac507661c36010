use thiserror::Error;

/// Everything that can abort an evaluation run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required interaction target never appeared within the wait bound.
    #[error("timed out waiting for {locator}")]
    Timeout { locator: String },

    /// The wait succeeded but the element was gone when we came to act on it.
    #[error("element vanished before it could be used: {locator}")]
    ElementMissing { locator: String },

    #[error("no option labelled {label:?} in {locator}")]
    OptionNotFound { locator: String, label: String },

    #[error("template error: {0}")]
    Template(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("invalid program: {0}")]
    InvalidProgram(String),

    #[error("driver error: {0}")]
    Driver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
