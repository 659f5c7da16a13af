//! Execution plan tree.
//!
//! An [`ExecutionNode`] is either leaf content (text to say, or a resource to
//! trigger), a composite of children, or both. Children live in three
//! independently ordered lists: sequential, parallel and background.
//! Parallel and background are hints for the consumer that runs the plan;
//! the tree itself has no concurrency semantics.

mod link;
mod node;

pub use link::{ChildList, LinkKind};
pub use node::{ExecutionNode, Leaf, ResourceCall, ResourceParameters};
