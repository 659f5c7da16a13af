//! Canonical textual rendering.

use super::{Connective, PlanVisitor, walk};
use crate::plan::{ExecutionNode, Leaf, ResourceParameters};

/// Renders `node` to its canonical string. An empty tree renders to "".
pub fn render_canonical(node: &ExecutionNode) -> String {
    let _span = tracing::debug_span!("plan.render").entered();
    walk(node, false, &mut CanonicalRenderer)
}

/// Text of a leaf, or `onResource(<label>, <value>, {<params>})`.
pub fn format_leaf(node: &ExecutionNode) -> String {
    match &node.leaf {
        Some(Leaf::Text(text)) if !text.is_empty() => text.clone(),
        Some(Leaf::Resource(call)) if !call.label.is_empty() => format!(
            "onResource({}, {}, {{{}}})",
            call.label,
            call.value,
            format_parameters(&call.parameters)
        ),
        _ => String::new(),
    }
}

/// `key=v1|v2, other=v` in insertion order.
pub fn format_parameters(parameters: &ResourceParameters) -> String {
    parameters
        .iter()
        .map(|(key, values)| format!("{}={}", key, values.join("|")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// [`PlanVisitor`] producing the canonical string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalRenderer;

impl PlanVisitor for CanonicalRenderer {
    type Output = String;

    fn leaf(&mut self, node: &ExecutionNode) -> String {
        format_leaf(node)
    }

    fn is_empty(&self, output: &String) -> bool {
        output.is_empty()
    }

    fn append(&mut self, mut output: String, child: String) -> String {
        output.push_str(&child);
        output
    }

    fn leaf_repeat(&mut self, output: String, count: u32) -> String {
        format!("{}\tNUMBER_OF_TIMES: {}", output, count)
    }

    fn connect(&mut self, mut output: String, connective: Connective) -> String {
        output.push_str(connective.separator());
        output
    }

    fn bracket(&mut self, output: String) -> String {
        format!("(\t{}\t)", output)
    }

    fn scope_repeat(&mut self, output: String, count: u32) -> String {
        format!("(\t{}\tNUMBER_OF_TIMES: {}\t)", output, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ResourceCall;
    use pretty_assertions::assert_eq;

    fn text(t: &str) -> ExecutionNode {
        ExecutionNode::from_text(t)
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(render_canonical(&ExecutionNode::new()), "");
        let hollow = ExecutionNode::new()
            .with_sequential(ExecutionNode::new())
            .with_parallel(ExecutionNode::new());
        assert_eq!(render_canonical(&hollow), "");
    }

    #[test]
    fn test_single_text() {
        assert_eq!(render_canonical(&text("Bonjour.")), "Bonjour.");
    }

    #[test]
    fn test_resource_format() {
        let call = ResourceCall::new("mission", "avance-id")
            .with_parameter("distance", ["1", "2"])
            .with_parameter("speed", ["slow"]);
        let node = ExecutionNode::from_resource(call);
        assert_eq!(
            render_canonical(&node),
            "onResource(mission, avance-id, {distance=1|2, speed=slow})"
        );
    }

    #[test]
    fn test_resource_without_parameters() {
        let node = ExecutionNode::from_resource(ResourceCall::new("anim", "wave"));
        assert_eq!(render_canonical(&node), "onResource(anim, wave, {})");
    }

    #[test]
    fn test_repeat_count_one_is_invisible() {
        let node = text("a")
            .with_resource_repeat_count(1)
            .with_scope_repeat_count(1);
        assert_eq!(render_canonical(&node), "a");
    }

    #[test]
    fn test_leaf_repeat_alone() {
        let node = text("saute").with_resource_repeat_count(3);
        assert_eq!(render_canonical(&node), "saute\tNUMBER_OF_TIMES: 3");
    }

    #[test]
    fn test_leaf_repeat_with_children_is_bracketed() {
        let node = text("a")
            .with_resource_repeat_count(2)
            .with_sequential(text("b"));
        assert_eq!(
            render_canonical(&node),
            "(\t(\ta\tNUMBER_OF_TIMES: 2\t)\tTHEN\tb\t)"
        );
    }

    #[test]
    fn test_sequential_leaves() {
        let node = text("Je me baignerai.").with_sequential(text("C'est fini."));
        assert_eq!(render_canonical(&node), "Je me baignerai.\tTHEN\tC'est fini.");
    }

    #[test]
    fn test_parallel_leaves() {
        let node = ExecutionNode::new()
            .with_parallel(text("lève le bras"))
            .with_parallel(text("dis bonjour"));
        assert_eq!(render_canonical(&node), "lève le bras\tAND\tdis bonjour");
    }

    #[test]
    fn test_parallel_then_sequential() {
        let node = text("a").with_parallel(text("b")).with_sequential(text("c"));
        // the sequential group wraps everything accumulated before it
        assert_eq!(render_canonical(&node), "(\ta\tAND\tb\tTHEN\tc\t)");
    }

    #[test]
    fn test_repeated_scope_before_sibling() {
        let repeated = text("leaf1")
            .with_sequential(text("leaf2"))
            .with_scope_repeat_count(4);
        let following = ExecutionNode::new().with_sequential(text("leaf3"));
        let root = ExecutionNode::new()
            .with_sequential(repeated)
            .with_sequential(following);
        assert_eq!(
            render_canonical(&root),
            "(\t(\tleaf1\tTHEN\tleaf2\t)\tNUMBER_OF_TIMES: 4\t)\tTHEN\t(\tleaf3\t)"
        );
    }

    #[test]
    fn test_background_without_prior_content() {
        let node = text("a").with_background(text("b"));
        assert_eq!(render_canonical(&node), "a\tIN_BACKGROUND: b");
    }

    #[test]
    fn test_background_after_sequential_leaf() {
        let node = ExecutionNode::new()
            .with_sequential(text("a"))
            .with_background(text("b"));
        assert_eq!(
            render_canonical(&node),
            "(\t(\ta\t)\tIN_BACKGROUND: b\t)"
        );
    }

    #[test]
    fn test_several_background_children() {
        let node = ExecutionNode::new()
            .with_background(text("x"))
            .with_background(text("y"));
        assert_eq!(
            render_canonical(&node),
            "\tIN_BACKGROUND: x\tIN_BACKGROUND: y"
        );
    }

    #[test]
    fn test_scope_repeat_always_wraps() {
        let node = text("a").with_scope_repeat_count(2);
        assert_eq!(render_canonical(&node), "(\ta\tNUMBER_OF_TIMES: 2\t)");
    }

    #[test]
    fn test_display_matches_render() {
        let node = text("a").with_sequential(text("b"));
        assert_eq!(node.to_string(), render_canonical(&node));
    }
}
