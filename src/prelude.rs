//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use execution_plan::prelude::*;
//!
//! let mut builder = ExecutionPlanBuilder::new();
//! builder.expose_text("Bonjour.");
//! assert_eq!(builder.render(), "Bonjour.");
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;

// Plan tree
pub use crate::plan::{ExecutionNode, Leaf, LinkKind, ResourceCall, ResourceParameters};

// Construction
pub use crate::builder::{EventLog, ExecutionPlanBuilder, PlanEvent, PlanSink};
pub use crate::config::{BranchPolicy, PlanConfig};

// Rendering and replay
pub use crate::render::{
    FlatParameters, PlanExecutor, RecordingExecutor, render_canonical, replay, replay_with,
};
