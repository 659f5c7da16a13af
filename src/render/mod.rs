//! Depth-first traversal of finished plans.
//!
//! Rendering to the canonical string and replaying into executor callbacks
//! share one walk ([`walk`]); a [`PlanVisitor`] decides what happens at a
//! leaf and at composite boundaries.
//!
//! Traversal order for a node: its own leaf, then parallel children, then
//! sequential children, then background children. Parallel and sequential
//! children without leaf data and without children are skipped.

mod canonical;
mod executor;

pub use canonical::{CanonicalRenderer, format_leaf, format_parameters, render_canonical};
pub use executor::{
    FirstValue, FlatParameters, ParameterFlattening, PlanExecutor, RecordingExecutor, replay,
    replay_with,
};

use crate::plan::{ChildList, ExecutionNode};

/// Connective placed between rendered items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connective {
    /// Between parallel children
    And,
    /// Between sequential children
    Then,
    /// Before each background child
    InBackground,
}

impl Connective {
    pub fn separator(&self) -> &'static str {
        match self {
            Connective::And => "\tAND\t",
            Connective::Then => "\tTHEN\t",
            Connective::InBackground => "\tIN_BACKGROUND: ",
        }
    }
}

/// Hooks invoked by [`walk`].
///
/// Boundary hooks default to passing the output through unchanged.
pub trait PlanVisitor {
    type Output;

    /// Output for the node's own leaf content (empty when it has none).
    fn leaf(&mut self, node: &ExecutionNode) -> Self::Output;

    fn is_empty(&self, output: &Self::Output) -> bool;

    /// Concatenate a rendered child onto the accumulated output.
    fn append(&mut self, output: Self::Output, child: Self::Output) -> Self::Output;

    fn leaf_repeat(&mut self, output: Self::Output, _count: u32) -> Self::Output {
        output
    }

    fn connect(&mut self, output: Self::Output, _connective: Connective) -> Self::Output {
        output
    }

    fn bracket(&mut self, output: Self::Output) -> Self::Output {
        output
    }

    fn scope_repeat(&mut self, output: Self::Output, _count: u32) -> Self::Output {
        output
    }
}

/// Walk `node` depth-first, folding the visitor's outputs.
///
/// `has_prior` is true when the node is one of several items of a list or
/// content was already emitted before it; composites are bracketed whenever
/// they could be confused with such surrounding content.
pub fn walk<V: PlanVisitor + ?Sized>(
    node: &ExecutionNode,
    has_prior: bool,
    visitor: &mut V,
) -> V::Output {
    let mut out = visitor.leaf(node);
    // Whether `out` already holds more than the bare leaf output.
    let mut extended = false;

    if node.resource_repeat_count > 1 {
        out = visitor.leaf_repeat(out, node.resource_repeat_count);
        extended = true;
        if has_prior || node.has_children() {
            out = visitor.bracket(out);
        }
    }

    for (list, connective) in [
        (ChildList::Parallel, Connective::And),
        (ChildList::Sequential, Connective::Then),
    ] {
        let children = node.children(list);
        if children.is_empty() {
            continue;
        }
        let wrap = has_prior || extended || !node.background.is_empty();
        let mut acc = out;
        for child in children
            .iter()
            .filter(|child| child.has_leaf_data() || child.has_children())
        {
            let acc_has_content = !visitor.is_empty(&acc);
            if acc_has_content {
                acc = visitor.connect(acc, connective);
                extended = true;
            }
            let rendered = walk(child, acc_has_content || children.len() > 1, visitor);
            if !visitor.is_empty(&rendered) {
                extended = true;
            }
            acc = visitor.append(acc, rendered);
        }
        out = if wrap {
            extended = true;
            visitor.bracket(acc)
        } else {
            acc
        };
    }

    if !node.background.is_empty() {
        let wrap = has_prior || extended;
        let mut acc = out;
        for child in &node.background {
            let child_has_prior = !visitor.is_empty(&acc) || node.background.len() > 1;
            let rendered = walk(child, child_has_prior, visitor);
            acc = visitor.connect(acc, Connective::InBackground);
            acc = visitor.append(acc, rendered);
        }
        out = if wrap { visitor.bracket(acc) } else { acc };
    }

    if node.scope_repeat_count > 1 {
        out = visitor.scope_repeat(out, node.scope_repeat_count);
    }
    out
}
