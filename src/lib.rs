//! # execution-plan
//!
//! Execution plans for natural-language reasoning engines.
//!
//! A reasoning engine decides, while analysing one utterance, what a robot or
//! dialogue agent should do: say some text, trigger a resource, repeat
//! something, run steps in parallel or in the background. It reports those
//! decisions as a flat stream of scope and leaf events. This crate assembles
//! the stream into an [`ExecutionNode`] tree, renders the tree to a canonical
//! string, and replays it into executor callbacks.
//!
//! ## Quick Start
//!
//! ```rust
//! use execution_plan::{ExecutionPlanBuilder, LinkKind, RecordingExecutor, ResourceParameters, replay};
//!
//! let mut builder = ExecutionPlanBuilder::new();
//! builder.begin_scope(LinkKind::Sequential);
//! let mut parameters = ResourceParameters::new();
//! parameters.insert("distance".into(), vec!["0,3 mètre".into()]);
//! builder.expose_resource("mission", "avance-id", parameters);
//! builder.end_scope();
//!
//! let plan = builder.finish();
//! assert_eq!(
//!     plan.to_canonical_string(),
//!     "onResource(mission, avance-id, {distance=0,3 mètre})"
//! );
//!
//! let mut executor = RecordingExecutor::new();
//! replay(&plan, &mut executor);
//! assert_eq!(executor.trace(), "onResource(mission, avance-id, {distance=0,3 mètre})");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod builder;
pub mod config;
pub mod plan;
pub mod prelude;
pub mod render;

// Re-exports for convenience
pub use builder::{EventLog, ExecutionPlanBuilder, PlanEvent, PlanSink};
pub use config::{BranchPolicy, ConfigError, PlanConfig};
pub use plan::{ChildList, ExecutionNode, Leaf, LinkKind, ResourceCall, ResourceParameters};
pub use render::{
    CanonicalRenderer, Connective, FirstValue, FlatParameters, ParameterFlattening, PlanExecutor,
    PlanVisitor, RecordingExecutor, render_canonical, replay, replay_with, walk,
};

/// Error type for execution-plan operations.
///
/// Building and rendering never fail; errors only arise at the crate
/// boundary (tokens, configuration, transcripts).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Scope link token not recognised.
    #[error("Unknown link kind: '{token}'")]
    UnknownLinkKind { token: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable could not be read.
    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl Error {
    pub fn unknown_link_kind(token: impl Into<String>) -> Self {
        Error::UnknownLinkKind {
            token: token.into(),
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Env(_))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::Env(e) => Error::Env(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
