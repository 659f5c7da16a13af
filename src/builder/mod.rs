//! Incremental construction of execution plans.
//!
//! ```rust
//! use execution_plan::{ExecutionPlanBuilder, LinkKind};
//!
//! let mut builder = ExecutionPlanBuilder::new();
//! builder.expose_text("Je me baignerai.");
//! builder.expose_text("C'est fini.");
//! assert_eq!(builder.render(), "Je me baignerai.\tTHEN\tC'est fini.");
//!
//! builder.begin_scope(LinkKind::Background);
//! builder.expose_text("musique");
//! builder.end_scope();
//! let plan = builder.finish();
//! assert_eq!(plan.background.len(), 1);
//! ```

mod event;
mod sink;

pub use event::{EventLog, PlanEvent};
pub use sink::PlanSink;

use crate::config::{BranchPolicy, PlanConfig};
use crate::plan::{ChildList, ExecutionNode, LinkKind, ResourceCall, ResourceParameters};

/// Position of a scope node inside its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeSlot {
    list: ChildList,
    index: usize,
}

/// One open scope. The root frame has no slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Frame {
    link: LinkKind,
    slot: Option<NodeSlot>,
}

impl Frame {
    const ROOT: Frame = Frame {
        link: LinkKind::Sequential,
        slot: None,
    };
}

/// Stack-based event sink that assembles an [`ExecutionNode`] tree.
///
/// The root frame is permanent: unbalanced `end_scope` calls are ignored, and
/// the tree is usable at any stack depth.
#[derive(Debug, Clone)]
pub struct ExecutionPlanBuilder {
    root: ExecutionNode,
    frames: Vec<Frame>,
    config: PlanConfig,
}

impl Default for ExecutionPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionPlanBuilder {
    pub fn new() -> Self {
        Self::with_config(PlanConfig::default())
    }

    pub fn with_config(config: PlanConfig) -> Self {
        Self {
            root: ExecutionNode::new(),
            frames: vec![Frame::ROOT],
            config,
        }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Number of open frames, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn root(&self) -> &ExecutionNode {
        &self.root
    }

    /// Link kind of the innermost open scope.
    pub fn current_link(&self) -> LinkKind {
        self.frames.last().map_or(LinkKind::Sequential, |f| f.link)
    }

    /// Node of the innermost open scope.
    pub fn current(&self) -> &ExecutionNode {
        self.frames
            .iter()
            .filter_map(|frame| frame.slot)
            .fold(&self.root, |node, slot| &node.children(slot.list)[slot.index])
    }

    fn current_mut(&mut self) -> &mut ExecutionNode {
        self.frames
            .iter()
            .filter_map(|frame| frame.slot)
            .fold(&mut self.root, |node, slot| {
                &mut node.children_mut(slot.list)[slot.index]
            })
    }

    /// Node that receives the next leaf write.
    fn leaf_target(&mut self) -> &mut ExecutionNode {
        let link = self.current_link();
        let policy = self.config.branch_policy;
        let node = self.current_mut();
        let occupied = match policy {
            BranchPolicy::WriteOnce => node.has_leaf_data() || node.has_children(),
            BranchPolicy::AlwaysBranch => true,
        };
        if !occupied {
            return node;
        }
        let siblings = node.children_mut(link.child_list());
        siblings.push(ExecutionNode::new());
        let index = siblings.len() - 1;
        &mut siblings[index]
    }

    pub fn expose_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::trace!(depth = self.depth(), text = %text, "expose text");
        self.leaf_target().set_text(text);
    }

    pub fn expose_resource(
        &mut self,
        label: impl Into<String>,
        value: impl Into<String>,
        parameters: ResourceParameters,
    ) {
        let call = ResourceCall::new(label, value).with_parameters(parameters);
        tracing::trace!(
            depth = self.depth(),
            label = %call.label,
            value = %call.value,
            "expose resource"
        );
        self.leaf_target().set_resource(call);
    }

    /// Open a scope under `link`.
    ///
    /// The new node joins the child list of the enclosing scope's link kind,
    /// except background scopes, which always join the background list.
    pub fn begin_scope(&mut self, link: LinkKind) {
        let Some(top) = self.frames.last().copied() else {
            return;
        };
        let list = if link == LinkKind::Background {
            ChildList::Background
        } else {
            top.link.child_list()
        };
        let children = self.current_mut().children_mut(list);
        children.push(ExecutionNode::new());
        let index = children.len() - 1;
        self.frames.push(Frame {
            link,
            slot: Some(NodeSlot { list, index }),
        });
        tracing::trace!(depth = self.depth(), link = %link, "begin scope");
    }

    /// Open a scope from an engine token such as `THEN` or `IN_BACKGROUND`.
    pub fn begin_scope_token(&mut self, token: &str) -> crate::Result<()> {
        let link = token.parse()?;
        self.begin_scope(link);
        Ok(())
    }

    pub fn end_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            tracing::trace!(depth = self.depth(), "end scope");
        } else {
            tracing::debug!("end scope at root ignored");
        }
    }

    /// Set the repeat count of the most recently written leaf of the current
    /// scope.
    pub fn set_leaf_repeat_count(&mut self, count: u32) {
        let count = clamp_repeat_count(count);
        let target = self.current_mut().last_descendant_mut();
        if !target.has_leaf_data() {
            tracing::debug!(count, "leaf repeat count set on a node without leaf data");
        }
        target.resource_repeat_count = count;
    }

    pub fn set_scope_repeat_count(&mut self, count: u32) {
        let count = clamp_repeat_count(count);
        self.current_mut().scope_repeat_count = count;
    }

    /// Canonical rendering of the tree built so far.
    pub fn render(&self) -> String {
        self.root.to_canonical_string()
    }

    /// Hand out the finished tree, whatever the remaining depth.
    pub fn finish(self) -> ExecutionNode {
        if self.frames.len() > 1 {
            tracing::warn!(
                open_scopes = self.frames.len() - 1,
                "Plan finished with unclosed scopes"
            );
        }
        self.root
    }

    /// Build a tree from a recorded event stream.
    pub fn from_events(events: &EventLog, config: PlanConfig) -> ExecutionNode {
        let mut builder = Self::with_config(config);
        events.replay_into(&mut builder);
        builder.finish()
    }
}

fn clamp_repeat_count(count: u32) -> u32 {
    if count == 0 {
        tracing::debug!("repeat count 0 clamped to 1");
        1
    } else {
        count
    }
}

impl PlanSink for ExecutionPlanBuilder {
    fn begin_scope(&mut self, link: LinkKind) {
        ExecutionPlanBuilder::begin_scope(self, link);
    }

    fn end_scope(&mut self) {
        ExecutionPlanBuilder::end_scope(self);
    }

    fn expose_text(&mut self, text: &str) {
        ExecutionPlanBuilder::expose_text(self, text);
    }

    fn expose_resource(&mut self, label: &str, value: &str, parameters: &ResourceParameters) {
        ExecutionPlanBuilder::expose_resource(self, label, value, parameters.clone());
    }

    fn set_leaf_repeat_count(&mut self, count: u32) {
        ExecutionPlanBuilder::set_leaf_repeat_count(self, count);
    }

    fn set_scope_repeat_count(&mut self, count: u32) {
        ExecutionPlanBuilder::set_scope_repeat_count(self, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &[&str])]) -> ResourceParameters {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_first_write_occupies_root() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.expose_text("bonjour");
        let plan = builder.finish();
        assert_eq!(plan.text(), Some("bonjour"));
        assert!(!plan.has_children());
    }

    #[test]
    fn test_second_write_spawns_sibling() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.expose_text("a");
        builder.expose_text("b");
        builder.expose_text("c");
        let plan = builder.finish();
        assert_eq!(plan.text(), Some("a"));
        let texts: Vec<_> = plan.sequential.iter().filter_map(|n| n.text()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn test_siblings_follow_scope_link() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Parallel);
        builder.expose_text("a");
        builder.expose_text("b");
        builder.end_scope();
        let plan = builder.finish();

        let scope = &plan.sequential[0];
        assert_eq!(scope.text(), Some("a"));
        assert_eq!(scope.parallel.len(), 1);
        assert_eq!(scope.parallel[0].text(), Some("b"));
    }

    #[test]
    fn test_scope_hosted_by_enclosing_link() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Parallel);
        builder.begin_scope(LinkKind::Sequential);
        builder.expose_text("x");
        builder.end_scope();
        builder.begin_scope(LinkKind::Sequential);
        builder.expose_text("y");
        builder.end_scope();
        builder.end_scope();
        let plan = builder.finish();

        let outer = &plan.sequential[0];
        assert_eq!(outer.parallel.len(), 2);
        assert_eq!(outer.parallel[0].text(), Some("x"));
        assert_eq!(outer.parallel[1].text(), Some("y"));
    }

    #[test]
    fn test_background_scope_always_uses_background_list() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Parallel);
        builder.begin_scope(LinkKind::Background);
        builder.expose_text("bg");
        builder.end_scope();
        builder.end_scope();
        let plan = builder.finish();

        let outer = &plan.sequential[0];
        assert!(outer.parallel.is_empty());
        assert_eq!(outer.background[0].text(), Some("bg"));
    }

    #[test]
    fn test_reversed_link_uses_sequential_list() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::SequentialReversed);
        builder.expose_text("a");
        builder.expose_text("b");
        builder.end_scope();
        let plan = builder.finish();
        assert_eq!(plan.sequential[0].sequential[0].text(), Some("b"));
    }

    #[test]
    fn test_end_scope_floor_at_root() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.end_scope();
        builder.end_scope();
        assert_eq!(builder.depth(), 1);

        builder.begin_scope(LinkKind::Sequential);
        assert_eq!(builder.depth(), 2);
        builder.end_scope();
        builder.end_scope();
        assert_eq!(builder.depth(), 1);
        builder.expose_text("still fine");
        assert_eq!(builder.root().sequential.len(), 2);
        assert_eq!(builder.root().sequential[1].text(), Some("still fine"));
    }

    #[test]
    fn test_unbalanced_stream_keeps_tree() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Sequential);
        builder.begin_scope(LinkKind::Parallel);
        builder.expose_text("deep");
        assert_eq!(builder.depth(), 3);
        let plan = builder.finish();
        assert_eq!(plan.sequential[0].sequential[0].text(), Some("deep"));
    }

    #[test]
    fn test_begin_scope_token() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope_token("AND").unwrap();
        assert_eq!(builder.current_link(), LinkKind::Parallel);

        let err = builder.begin_scope_token("MAYBE").unwrap_err();
        assert!(matches!(err, crate::Error::UnknownLinkKind { .. }));
        assert_eq!(builder.depth(), 2);
    }

    #[test]
    fn test_expose_resource() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.expose_resource("mission", "avance-id", params(&[("distance", &["1m"])]));
        let plan = builder.finish();
        let call = plan.resource().unwrap();
        assert_eq!(call.label, "mission");
        assert_eq!(call.value, "avance-id");
        assert_eq!(call.parameters["distance"], vec!["1m"]);
    }

    #[test]
    fn test_leaf_repeat_targets_last_leaf() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Sequential);
        builder.expose_text("a");
        builder.expose_text("b");
        builder.set_leaf_repeat_count(3);
        builder.end_scope();
        let plan = builder.finish();

        let scope = &plan.sequential[0];
        assert_eq!(scope.resource_repeat_count, 1);
        assert_eq!(scope.sequential[0].resource_repeat_count, 3);
    }

    #[test]
    fn test_leaf_repeat_after_closed_scope() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Sequential);
        builder.expose_text("inner");
        builder.end_scope();
        builder.set_leaf_repeat_count(2);
        let plan = builder.finish();
        assert_eq!(plan.sequential[0].resource_repeat_count, 2);
        assert_eq!(plan.resource_repeat_count, 1);
    }

    #[test]
    fn test_leaf_repeat_without_leaf_annotates_empty_node() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Parallel);
        builder.set_leaf_repeat_count(5);
        let plan = builder.finish();
        let scope = &plan.sequential[0];
        assert!(!scope.has_leaf_data());
        assert_eq!(scope.resource_repeat_count, 5);
    }

    #[test]
    fn test_scope_repeat_targets_current_scope() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Sequential);
        builder.expose_text("a");
        builder.expose_text("b");
        builder.set_scope_repeat_count(4);
        builder.end_scope();
        let plan = builder.finish();
        assert_eq!(plan.sequential[0].scope_repeat_count, 4);
        assert_eq!(plan.sequential[0].sequential[0].scope_repeat_count, 1);
    }

    #[test]
    fn test_zero_repeat_count_clamped() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.expose_text("a");
        builder.set_leaf_repeat_count(0);
        builder.set_scope_repeat_count(0);
        let plan = builder.finish();
        assert_eq!(plan.resource_repeat_count, 1);
        assert_eq!(plan.scope_repeat_count, 1);
    }

    #[test]
    fn test_empty_text_does_not_occupy() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.expose_text("");
        builder.expose_text("real");
        let plan = builder.finish();
        assert_eq!(plan.text(), Some("real"));
        assert!(!plan.has_children());
    }

    #[test]
    fn test_always_branch_policy() {
        let config = PlanConfig::new().branch_policy(BranchPolicy::AlwaysBranch);
        let mut builder = ExecutionPlanBuilder::with_config(config);
        builder.expose_text("a");
        builder.expose_text("b");
        let plan = builder.finish();
        assert!(plan.leaf.is_none());
        assert_eq!(plan.sequential.len(), 2);
    }

    #[test]
    fn test_current_tracks_open_scope() {
        let mut builder = ExecutionPlanBuilder::new();
        builder.begin_scope(LinkKind::Parallel);
        builder.expose_text("here");
        assert_eq!(builder.current().text(), Some("here"));
        builder.end_scope();
        assert!(builder.current().leaf.is_none());
    }

    #[test]
    fn test_from_events() {
        let mut log = EventLog::new();
        log.begin_scope(LinkKind::Sequential);
        log.expose_text("a");
        log.end_scope();

        let plan = ExecutionPlanBuilder::from_events(&log, PlanConfig::default());
        assert_eq!(plan.sequential[0].text(), Some("a"));
    }
}
